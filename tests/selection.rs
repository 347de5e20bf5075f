//! Stream selection integration tests.

use subextract::{
    LanguageSelector, StreamSelector, SubtitleStreamInfo, normalize_language, select_streams,
};

fn container() -> Vec<SubtitleStreamInfo> {
    vec![
        SubtitleStreamInfo::new(2, "ass", Some("eng")),
        SubtitleStreamInfo::new(3, "subrip", Some("ger")),
        SubtitleStreamInfo::new(4, "subrip", Some("en-US")),
        SubtitleStreamInfo::new(5, "mov_text", None),
        SubtitleStreamInfo::new(6, "hdmv_pgs_subtitle", Some("fre")),
    ]
}

#[test]
fn all_selects_every_stream_in_order() {
    assert_eq!(
        select_streams(&container(), &StreamSelector::All),
        vec![2, 3, 4, 5, 6]
    );
}

#[test]
fn index_selects_exactly_one() {
    assert_eq!(select_streams(&container(), &StreamSelector::Index(3)), vec![3]);
    assert!(select_streams(&container(), &StreamSelector::Index(9)).is_empty());
}

#[test]
fn language_selects_matching_and_untagged() {
    let english = StreamSelector::Language(LanguageSelector::new("en_GB.UTF-8"));
    assert_eq!(select_streams(&container(), &english), vec![2, 4, 5]);

    let french = StreamSelector::Language(LanguageSelector::new("fr"));
    assert_eq!(select_streams(&container(), &french), vec![5, 6]);
}

#[test]
fn unknown_language_still_gets_untagged_streams() {
    let japanese = StreamSelector::Language(LanguageSelector::new("ja"));
    assert_eq!(select_streams(&container(), &japanese), vec![5]);
}

#[test]
fn empty_container_selects_nothing() {
    assert!(select_streams(&[], &StreamSelector::All).is_empty());
}

#[test]
fn locale_strings_normalise() {
    assert_eq!(normalize_language("pt_BR.UTF-8"), "pt");
    assert_eq!(normalize_language("EN"), "en");
    assert_eq!(LanguageSelector::new("Deutsch").target(), "de");
}
