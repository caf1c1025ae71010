use ime_core::core::input::ComposedData;
use ime_core::core::ngram::NgramContext;
use ime_core::core::types::{WordEntry, NOT_A_PROBABILITY};
use ime_core::dictionary::binary::BinaryDictionary;
use ime_core::dictionary::{SuggestionQuery, SuggestionSettings};
use ime_core::persistence::{DictionaryHeader, DictionaryPayload};
use ime_core::{Dictionary, DictionaryCollection, Locale, ReadOnlyBinaryDictionary, SessionId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn dictionary(words: &[(&str, i32)]) -> ReadOnlyBinaryDictionary {
    let payload = DictionaryPayload {
        header: DictionaryHeader {
            locale: Locale::new("en"),
            dict_type: "main".into(),
            description: String::new(),
            version: 1,
        },
        words: words
            .iter()
            .map(|(w, f)| WordEntry { word: w.to_string(), frequency: *f, possibly_offensive: false })
            .collect(),
        bigrams: vec![],
    };
    ReadOnlyBinaryDictionary::from_binary(BinaryDictionary::from_payload(payload, false), Locale::new("en"), "main")
}

#[test]
fn readers_racing_close_only_see_real_answers_or_no_data() {
    let dict = Arc::new(dictionary(&[("cat", 90), ("catalog", 40), ("car", 100)]));
    let readers = 8;
    let start = Arc::new(Barrier::new(readers + 1));
    let stop = Arc::new(AtomicBool::new(false));
    let answered = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..readers)
        .map(|i| {
            let dict = Arc::clone(&dict);
            let start = Arc::clone(&start);
            let stop = Arc::clone(&stop);
            let answered = Arc::clone(&answered);
            thread::spawn(move || {
                let composed = ComposedData::from_typed("ca");
                let ngram = NgramContext::empty();
                let settings = SuggestionSettings::default();
                start.wait();
                while !stop.load(Ordering::SeqCst) {
                    let f = dict.get_frequency("cat");
                    assert!(f == 90 || f == NOT_A_PROBABILITY, "unexpected frequency {f}");
                    let query = SuggestionQuery {
                        composed: &composed,
                        ngram_context: &ngram,
                        settings: &settings,
                        session_id: SessionId(i as u32),
                        weight_for_locale: 1.0,
                    };
                    if let Some(list) = dict.get_suggestions(&query) {
                        assert!(list.iter().all(|s| s.word().starts_with("ca")));
                        answered.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    start.wait();
    thread::sleep(Duration::from_millis(20));
    dict.close();
    assert_eq!(dict.get_frequency("cat"), NOT_A_PROBABILITY);
    assert!(!dict.is_in_dictionary("cat"));
    thread::sleep(Duration::from_millis(20));
    stop.store(true, Ordering::SeqCst);
    for h in handles {
        h.join().unwrap();
    }
    assert!(!dict.is_valid_dictionary());
}

#[test]
fn collection_queries_survive_membership_changes() {
    let collection = Arc::new(DictionaryCollection::new("merged", None));
    let members: Vec<Arc<dyn Dictionary>> = (0..4)
        .map(|i| Arc::new(dictionary(&[("cat", 10 * (i + 1))])) as Arc<dyn Dictionary>)
        .collect();
    let stop = Arc::new(AtomicBool::new(false));

    let reader = {
        let collection = Arc::clone(&collection);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                let f = collection.get_frequency("cat");
                assert!(f == NOT_A_PROBABILITY || (10..=40).contains(&f));
            }
        })
    };

    for _ in 0..50 {
        for m in &members {
            collection.add_dictionary(Arc::clone(m));
        }
        for m in &members {
            collection.remove_dictionary(m);
        }
    }
    collection.add_dictionary(Arc::clone(&members[3]));
    stop.store(true, Ordering::SeqCst);
    reader.join().unwrap();
    assert_eq!(collection.get_frequency("cat"), 40);
}
