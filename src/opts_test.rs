use crate::opts::{DecodeOptions, EncodingErrors, ResultsType};

#[test]
fn results_type_aliases() {
    assert_eq!(ResultsType::parse("tuple"), ResultsType::Tuples);
    assert_eq!(ResultsType::parse("tuples"), ResultsType::Tuples);
    assert_eq!(ResultsType::parse("dict"), ResultsType::Dicts);
    assert_eq!(ResultsType::parse("dicts"), ResultsType::Dicts);
    assert_eq!(ResultsType::parse("namedtuple"), ResultsType::NamedTuples);
    assert_eq!(ResultsType::parse("namedtuples"), ResultsType::NamedTuples);
    assert_eq!(
        ResultsType::parse("structsequence"),
        ResultsType::StructSequences
    );
    assert_eq!(
        ResultsType::parse("structsequences"),
        ResultsType::StructSequences
    );
}

#[test]
fn unknown_results_type_means_tuples() {
    assert_eq!(ResultsType::parse("frames"), ResultsType::Tuples);
    assert_eq!(ResultsType::parse(""), ResultsType::Tuples);
}

#[test]
fn encoding_errors_parse() {
    assert_eq!(EncodingErrors::parse("strict"), EncodingErrors::Strict);
    assert_eq!(EncodingErrors::parse("replace"), EncodingErrors::Replace);
    assert_eq!(EncodingErrors::parse("ignore"), EncodingErrors::Ignore);
    assert_eq!(EncodingErrors::parse("warn"), EncodingErrors::Strict);
}

#[test]
fn defaults() {
    let opts = DecodeOptions::default();
    assert_eq!(opts.results_type, ResultsType::Tuples);
    assert_eq!(opts.encoding_errors, EncodingErrors::Strict);
    assert!(!opts.parse_json);
    assert!(!opts.unbuffered);
    assert!(opts.invalid_values.is_empty());
}
