use std::collections::BTreeSet;

use wordtrie::script::{parse_script, run};
use wordtrie::{Outcome, Trie};

// small deterministic generator so the word mix is stable across runs
struct Words(u64);

impl Words {
    fn next_word(&mut self) -> String {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let len = (self.0 >> 60) as usize % 6;
        (0..len)
            .map(|i| (b'a' + ((self.0 >> (8 * i + 3)) % 4) as u8) as char)
            .collect()
    }
}

#[test]
fn matches_a_set_under_mixed_inserts_and_deletes() {
    let mut words = Words(42);
    let mut trie = Trie::new();
    let mut model = BTreeSet::new();

    for step in 0..2_000 {
        let word = words.next_word();
        if step % 3 == 0 {
            trie.delete(word.as_str());
            model.remove(&word);
        } else {
            trie.insert(word.as_str()).unwrap();
            model.insert(word.clone());
        }
        assert_eq!(model.contains(&word), trie.search(word.as_str()));
    }

    let mut probe = Words(7);
    for _ in 0..500 {
        let word = probe.next_word();
        assert_eq!(model.contains(&word), trie.search(word.as_str()), "{:?}", word);
    }

    for word in model.clone() {
        trie.delete(word.as_str());
        model.remove(&word);
        for left in &model {
            assert!(trie.search(left.as_str()), "{} lost after deleting {}", left, word);
        }
    }
    assert!(trie.is_empty());
    assert!(trie.node_count() <= 1);
}

#[test]
fn script_reports_searches_in_order() {
    let commands = parse_script(
        "insert ant\ninsert anti\ninsert antio\ndelete ant\nsearch ant\nsearch anti\nsearch antio\n",
    )
    .unwrap();
    let mut trie = Trie::new();
    let lines: Vec<String> = run(&mut trie, &commands)
        .iter()
        .filter(|outcome| matches!(outcome, Outcome::Found { .. }))
        .map(|outcome| outcome.to_string())
        .collect();
    assert_eq!(
        vec![
            "Search word ant: false",
            "Search word anti: true",
            "Search word antio: true"
        ],
        lines
    );
}
