use fihrist_core::tokenizer::{analyze, fold_case, is_valid_term};

#[test]
fn corpus_style_capital_dotted_i_folds_to_dotless_i() {
    // İSTANBUL as the corpus encodes it: 'I' 0xB0, then ASCII capitals.
    let mut token = vec![0x49, 0xB0, 0x53, 0x54, 0x41, 0x4E, 0x42, 0x55, 0x4C];
    fold_case(&mut token);
    assert_eq!(token, [0xC4, 0xB1, 0x73, 0x74, 0x61, 0x6E, 0x62, 0x75, 0x6C]);
}

#[test]
fn latin1_uppercase_bytes_shift_down() {
    let mut token = vec![0xC0, 0xDE, 0xDF, 0xFF];
    fold_case(&mut token);
    assert_eq!(token, [0xE0, 0xFE, 0xDF, 0xFF]);
}

#[test]
fn utf8_dotless_i_survives_folding() {
    let mut token = "osmanlı".as_bytes().to_vec();
    fold_case(&mut token);
    assert_eq!(token, "osmanlı".as_bytes());
}

#[test]
fn lone_capital_i_just_lowercases() {
    let mut token = b"ISTANBUL".to_vec();
    fold_case(&mut token);
    assert_eq!(token, b"istanbul");
}

#[test]
fn validator_keeps_two_byte_ascii_words() {
    for term in [&b"bu"[..], b"ve", b"ev", b"kitap", b"a1"] {
        assert!(is_valid_term(term), "{term:?} should pass");
    }
}

#[test]
fn validator_drops_singles_numbers_and_pure_multibyte_words() {
    assert!(!is_valid_term(b"a"));
    assert!(!is_valid_term(b"42"));
    assert!(!is_valid_term(b"1_2"));
    // Pure Turkish orthography has no ASCII letters at all.
    assert!(!is_valid_term("çığ".as_bytes()));
}

#[test]
fn analyze_keeps_all_short_words_of_the_scenario() {
    let terms = analyze(b"bu ve ev kitap a", false);
    let words: Vec<&[u8]> = terms.iter().map(Vec::as_slice).collect();
    assert_eq!(words, [&b"bu"[..], b"ve", b"ev", b"kitap"]);
}

#[test]
fn analyze_runs_the_full_pipeline_over_a_title() {
    let title = [0x49, 0xB0, 0x53, 0x54, 0x41, 0x4E, 0x42, 0x55, 0x4C];
    let terms = analyze(&title, false);
    assert_eq!(terms.len(), 1);
    assert_eq!(
        terms[0],
        [0xC4, 0xB1, 0x73, 0x74, 0x61, 0x6E, 0x62, 0x75, 0x6C]
    );
}

#[test]
fn underscores_join_tokens_and_digits_need_a_letter() {
    let terms = analyze(b"foo_bar 123 7a", false);
    let words: Vec<&[u8]> = terms.iter().map(Vec::as_slice).collect();
    assert_eq!(words, [&b"foo_bar"[..], b"7a"]);
}

#[test]
fn stray_high_byte_joins_two_letter_runs() {
    let terms = analyze(b"ab\x80cd ef", false);
    let words: Vec<&[u8]> = terms.iter().map(Vec::as_slice).collect();
    assert_eq!(words, [&b"ab\x80cd"[..], b"ef"]);
}

#[test]
fn tokens_truncate_at_255_bytes() {
    let mut text = vec![b'a'; 300];
    text.extend_from_slice(b" ev");
    let terms = analyze(&text, false);
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].len(), 255);
    assert_eq!(terms[1], b"ev");
}

#[test]
fn stemming_applies_to_the_final_token_of_the_text() {
    // No trailing separator: the flush at end-of-text stems too.
    let terms = analyze(b"kitaplar", true);
    assert_eq!(terms, [b"kitap".to_vec()]);
}

#[test]
fn stemming_runs_between_folding_and_validation() {
    let terms = analyze(b"KITAPLAR evde", true);
    let words: Vec<&[u8]> = terms.iter().map(Vec::as_slice).collect();
    // `evde` is four bytes, below the stemmer's guard, and stays whole.
    assert_eq!(words, [&b"kitap"[..], b"evde"]);
}
