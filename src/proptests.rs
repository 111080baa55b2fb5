use super::*;

use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

const COMBOS: [(EngineKind, StorageKind); 4] = [
    (EngineKind::Dual, StorageKind::Arena),
    (EngineKind::Dual, StorageKind::Pointer),
    (EngineKind::Mixed, StorageKind::Arena),
    (EngineKind::Mixed, StorageKind::Pointer),
];

/// Node count implied by the words: one per distinct proper prefix of each
/// key the engine inserts, roots included.
fn expected_nodes(corpus: &Corpus, engine: EngineKind) -> usize {
    let length = corpus.word_length();
    if length == 0 || corpus.is_empty() {
        return 0;
    }

    let mut keys: Vec<Vec<Vec<u8>>> = Vec::new();
    match engine {
        EngineKind::Dual => {
            keys.push(corpus.iter().map(|(w, _)| w.to_vec()).collect());
            keys.push(corpus.iter().map(|(w, _)| w.iter().rev().copied().collect()).collect());
        }
        EngineKind::Mixed => {
            keys.push(
                corpus
                    .iter()
                    .map(|(w, _)| {
                        let mut mixed = vec![0u8; length];
                        interleave(w, &mut mixed);
                        mixed
                    })
                    .collect(),
            );
        }
    }

    keys.iter()
        .map(|trie| {
            let prefixes: HashSet<&[u8]> = trie
                .iter()
                .flat_map(|key| (0..length).map(move |n| &key[..n]))
                .collect();
            prefixes.len()
        })
        .sum()
}

fn corpus_strategy() -> impl Strategy<Value = Corpus> {
    (0usize..=6).prop_flat_map(|length| {
        let word = prop::collection::vec(b'a'..=b'c', length);
        prop::collection::vec(word, 0..=40).prop_map(move |words| {
            let distinct: BTreeSet<Vec<u8>> = words.into_iter().collect();
            let pairs = distinct.into_iter().rev().zip(0u32..);
            Corpus::from_pairs(length, pairs).unwrap()
        })
    })
}

fn query_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    // 'd' never occurs in a word, so some queries must miss.
    let affix = prop::collection::vec(b'a'..=b'd', 0..=6);
    (affix.clone(), affix)
}

fn clip(length: usize, (prefix, mut suffix): (Vec<u8>, Vec<u8>)) -> (Vec<u8>, Vec<u8>) {
    let prefix: Vec<u8> = prefix.into_iter().take(length).collect();
    suffix.truncate(length - prefix.len());
    (prefix, suffix)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_scan(
        corpus in corpus_strategy(),
        queries in prop::collection::vec(query_strategy(), 0..=64),
    ) {
        let length = corpus.word_length();
        let indexes: Vec<AffixIndex> = COMBOS
            .iter()
            .map(|&(engine, storage)| AffixIndex::build(&corpus, &Config::new(engine, storage)).unwrap())
            .collect();

        for index in &indexes {
            prop_assert_eq!(index.len(), corpus.len());
            prop_assert_eq!(index.node_count(), expected_nodes(&corpus, index.engine()));
            prop_assert_eq!(index.collect(b"", b"").unwrap().len(), corpus.len());
        }

        for query in queries {
            let (prefix, suffix) = clip(length, query);
            let mut expected = corpus.scan(&prefix, &suffix);
            expected.sort_unstable();

            for index in &indexes {
                let got = index.collect(&prefix, &suffix).unwrap();
                prop_assert_eq!(&got, &expected, "{:?}", index);
                if prefix.len() + suffix.len() == length {
                    prop_assert!(got.len() <= 1);
                }
            }
        }
    }

    #[test]
    fn prop_word_splits_find_the_word(corpus in corpus_strategy()) {
        let length = corpus.word_length();
        for &(engine, storage) in &COMBOS {
            let index = AffixIndex::build(&corpus, &Config::new(engine, storage)).unwrap();
            for (word, id) in corpus.iter() {
                for split in 0..=length {
                    let (prefix, suffix) = word.split_at(split);
                    prop_assert_eq!(index.collect(prefix, suffix).unwrap(), vec![id]);

                    let mut count = 0;
                    let reported = index.query(&prefix[..split / 2], suffix, |_| count += 1).unwrap();
                    prop_assert_eq!(reported, count);
                    prop_assert!(count >= 1);
                }
            }
        }
    }

    #[test]
    fn prop_interleave_inverts(word in prop::collection::vec(b'a'..=b'z', 0..=64)) {
        let mut mixed = vec![0u8; word.len()];
        interleave(&word, &mut mixed);
        let mut back = vec![0u8; word.len()];
        deinterleave(&mixed, &mut back);
        prop_assert_eq!(back, word);
    }
}

/// Call `f` with every ordering of the identities `0..count`, generated
/// iteratively by Heap's algorithm.
fn for_each_id_order(count: u32, mut f: impl FnMut(&[u32])) {
    let mut ids: Vec<u32> = (0..count).collect();
    let mut counters = vec![0usize; ids.len()];
    f(&ids);

    let mut i = 1;
    while i < ids.len() {
        if counters[i] < i {
            let other = if i % 2 == 0 { 0 } else { counters[i] };
            ids.swap(other, i);
            f(&ids);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

#[test]
fn exhaustive_identity_assignment_small_set() {
    let words: [&[u8]; 5] = [b"abca", b"abcb", b"bbca", b"cbaa", b"abaa"];
    let queries: [(&[u8], &[u8]); 6] = [
        (b"", b""),
        (b"a", b""),
        (b"", b"a"),
        (b"ab", b"a"),
        (b"b", b"ca"),
        (b"c", b"b"),
    ];

    let mut seen = BTreeSet::new();
    for_each_id_order(words.len() as u32, |order| {
        seen.insert(order.to_vec());
        let corpus = Corpus::from_pairs(4, words.iter().copied().zip(order.iter().copied())).unwrap();
        for &(engine, storage) in &COMBOS {
            let index = AffixIndex::build(&corpus, &Config::new(engine, storage)).unwrap();
            for &(prefix, suffix) in &queries {
                let mut expected = corpus.scan(prefix, suffix);
                expected.sort_unstable();
                assert_eq!(index.collect(prefix, suffix).unwrap(), expected);
            }
        }
    });
    assert_eq!(seen.len(), 120);
}
