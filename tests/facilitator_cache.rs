use ime_core::core::input::ComposedData;
use ime_core::core::ngram::{NgramContext, PrevWord};
use ime_core::persistence::{self, DictionaryHeader, DictionaryPayload};
use ime_core::{
    Dictionary, DictionaryFacilitator, DictionaryFacilitatorLruCache, DictionaryGroupFacilitator,
    EngineConfig, Locale, ReadOnlyBinaryDictionary, SessionId, SuggestionList, WaitPolicy,
};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const EN_WORDS: &str = "\
# English test list
the\t200
they\t150
cat\t90
car\t100
damn\t80\toffensive
>the cat\t200
";

const FR_WORDS: &str = "le\t200\nchat\t90\nchien\t80\n";

fn build(dir: &Path, file: &str, locale: &str, dict_type: &str, list: &str) -> DictionaryPayload {
    let (words, bigrams) = persistence::parse_word_list(list).unwrap();
    let payload = DictionaryPayload {
        header: DictionaryHeader {
            locale: Locale::new(locale),
            dict_type: dict_type.into(),
            description: format!("{locale} test"),
            version: 1,
        },
        words,
        bigrams,
    };
    persistence::save_dictionary(&dir.join(file), &payload).unwrap();
    payload
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    build(dir.path(), "main_en_US.dict", "en_US", "main", EN_WORDS);
    build(dir.path(), "main_fr.dict", "fr", "main", FR_WORDS);
    build(dir.path(), "my_contacts_en_US.dict", "en_US", "contacts", "Catriona\t250\n");
    dir
}

fn cache(dir: &Path) -> DictionaryFacilitatorLruCache<DictionaryGroupFacilitator> {
    let config = EngineConfig { dictionary_dir: dir.to_path_buf(), ..EngineConfig::default() };
    DictionaryFacilitatorLruCache::new(DictionaryGroupFacilitator::from_config(&config), "my_")
        .with_wait_policy(config.wait_policy())
}

#[test]
fn get_returns_a_loaded_facilitator() {
    let dir = fixture();
    let cache = cache(dir.path());
    let f = cache.get(&Locale::new("en-us"));
    assert!(f.is_for_locale(&Locale::new("en_US")));
    assert!(f.has_at_least_one_initialized_main_dictionary());
    assert_eq!(f.get_frequency("they"), 150);

    let got = f.get_suggestions(&ComposedData::from_typed("ca"), &NgramContext::beginning_of_sentence(), SessionId(1));
    let words: Vec<&str> = got.infos().iter().map(|i| i.word()).collect();
    assert_eq!(words[0], "ca");
    assert!(words.contains(&"car"));
    assert!(words.contains(&"cat"));
}

#[test]
fn switching_locales_rebuilds_the_single_slot() {
    let dir = fixture();
    let cache = cache(dir.path());
    let en = cache.get(&Locale::new("en_US"));
    let fr = cache.get(&Locale::new("fr"));
    assert!(std::sync::Arc::ptr_eq(&en, &fr));
    assert!(!en.is_for_locale(&Locale::new("en_US")));
    assert_eq!(fr.get_frequency("chat"), 90);
    assert_eq!(fr.get_frequency("cat"), -1);

    let en = cache.get(&Locale::new("en_US"));
    assert_eq!(en.get_frequency("cat"), 90);
}

#[test]
fn contacts_follow_the_cache_flag() {
    let dir = fixture();
    let cache = cache(dir.path());
    let f = cache.get(&Locale::new("en_US"));
    assert!(!f.is_valid_word("Catriona"));

    cache.set_use_contacts_dictionary(true);
    assert!(f.is_valid_word("Catriona"));
    assert_eq!(f.get_frequency("Catriona"), 250);

    cache.set_use_contacts_dictionary(false);
    assert!(!f.is_valid_word("Catriona"));
    // The main dictionary survived both resets.
    assert_eq!(f.get_frequency("the"), 200);
}

#[test]
fn bigram_predictions_flow_through_the_cache() {
    let dir = fixture();
    let cache = cache(dir.path());
    let f = cache.get(&Locale::new("en_US"));
    let ctx = NgramContext::beginning_of_sentence().next(PrevWord::Word("the".into()));
    let got = f.get_suggestions(&ComposedData::from_typed(""), &ctx, SessionId(2));
    assert!(got.is_prediction());
    assert_eq!(got.word(0), Some("cat"));
}

#[test]
fn offensive_words_stay_out_of_suggestions() {
    let dir = fixture();
    let cache = cache(dir.path());
    let f = cache.get(&Locale::new("en_US"));
    let got = f.get_suggestions(&ComposedData::from_typed("dam"), &NgramContext::empty(), SessionId(1));
    assert!(got.infos().iter().all(|i| i.word() != "damn"));
}

#[test]
fn unknown_locale_gives_up_quickly_with_no_main_dictionary() {
    let dir = fixture();
    let cache = cache(dir.path())
        .with_wait_policy(WaitPolicy { timeout: Duration::from_millis(50), max_retries: 2 });
    let f = cache.get(&Locale::new("de"));
    assert!(f.is_for_locale(&Locale::new("de")));
    assert!(!f.has_at_least_one_initialized_main_dictionary());
    assert!(f.get_suggestions(&ComposedData::from_typed("ha"), &NgramContext::empty(), SessionId(1)).infos().len() <= 1);
}

#[test]
fn closing_the_cache_closes_the_dictionaries() {
    let dir = fixture();
    let cache = cache(dir.path());
    let f = cache.get(&Locale::new("en_US"));
    cache.close_dictionaries();
    assert!(!f.has_at_least_one_initialized_main_dictionary());
    assert_eq!(f.get_frequency("the"), -1);
}

#[test]
fn bundled_dictionaries_open_by_address() {
    let dir = fixture();
    let en = build(dir.path(), "tmp_en.dict", "en_US", "main", EN_WORDS);
    let fr = build(dir.path(), "tmp_fr.dict", "fr", "main", FR_WORDS);
    let bundle = dir.path().join("all.bundle");
    let addresses = persistence::save_bundle(&bundle, &[en, fr]).unwrap();
    assert!(addresses.iter().all(|a| !a.points_to_physical_file()));

    let fr = ReadOnlyBinaryDictionary::open(&addresses[1], false, Locale::new("fr"), "main");
    assert!(fr.is_valid_dictionary());
    assert_eq!(fr.get_frequency("chien"), 80);
    assert_eq!(fr.get_frequency("cat"), -1);
}
