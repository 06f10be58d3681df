//! Unit tests covering `suggest` configuration and lookups.

use std::sync::Arc;

use super::helpers::{Workspace, output_lines};
use super::*;
use crate::suggest::{
    OwnerSelector, SuggestArgs, SuggestConfig, SuggestLevel, run_suggest, suggest_names,
};
use geoscout_core::test_support::{SAMPLE_REGION, sample_region_archive};
use geoscout_core::{AddressIndex, RegionFile};
use rstest::{fixture, rstest};

#[fixture]
fn args() -> SuggestArgs {
    SuggestArgs {
        region_file: Some("bavaria.gsrg".into()),
        region: Some(SAMPLE_REGION.to_owned()),
        ..SuggestArgs::default()
    }
}

#[fixture]
fn index() -> AddressIndex {
    AddressIndex::new(
        SAMPLE_REGION,
        Arc::new(RegionFile::from_archive(sample_region_archive())),
    )
}

fn config(level: SuggestLevel, prefix: &str) -> SuggestConfig {
    SuggestConfig {
        region_file: "bavaria.gsrg".into(),
        region: SAMPLE_REGION.to_owned(),
        level,
        prefix: prefix.to_owned(),
        use_english_names: false,
        owner: None,
        street: None,
    }
}

#[rstest]
fn converting_without_region_file_errors(mut args: SuggestArgs) {
    args.region_file = None;
    let err = SuggestConfig::try_from(args).expect_err("missing region file should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REGION_FILE);
            assert_eq!(env, ENV_REGION_FILE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_without_region_errors(mut args: SuggestArgs) {
    args.region = None;
    let err = SuggestConfig::try_from(args).expect_err("missing region should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REGION);
            assert_eq!(env, ENV_REGION);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_defaults_to_city_level(args: SuggestArgs) {
    let config = SuggestConfig::try_from(args).expect("config should build");
    assert_eq!(config.level, SuggestLevel::Cities);
    assert_eq!(config.prefix, "");
    assert!(!config.use_english_names);
    assert_eq!(config.owner, None);
}

#[rstest]
#[case::streets(SuggestLevel::Streets)]
#[case::buildings(SuggestLevel::Buildings)]
fn lower_levels_need_an_owner(mut args: SuggestArgs, #[case] level: SuggestLevel) {
    args.level = Some(level);
    args.street = Some("Marienplatz".to_owned());
    let err = SuggestConfig::try_from(args).expect_err("missing owner should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_CITY_ID);
            assert_eq!(env, ENV_CITY_ID);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn city_and_postcode_conflict(mut args: SuggestArgs) {
    args.level = Some(SuggestLevel::Streets);
    args.city_id = Some(1);
    args.postcode = Some("80331".to_owned());
    let err = SuggestConfig::try_from(args).expect_err("conflicting owners should error");
    assert!(matches!(err, CliError::ConflictingOwners), "{err:?}");
}

#[rstest]
fn buildings_need_a_street(mut args: SuggestArgs) {
    args.level = Some(SuggestLevel::Buildings);
    args.city_id = Some(1);
    let err = SuggestConfig::try_from(args).expect_err("missing street should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_STREET);
            assert_eq!(env, ENV_STREET);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case::substring("burg", false, vec!["Burgau", "Augsburg"])]
#[case::villages("dorf", false, vec!["Dorfen", "Oberdorf"])]
#[case::postcodes("12", false, vec!["12345", "61200"])]
#[case::english("mun", true, vec!["Munich"])]
fn cities_are_suggested(
    index: AddressIndex,
    #[case] prefix: &str,
    #[case] english: bool,
    #[case] expected: Vec<&str>,
) {
    let mut config = config(SuggestLevel::Cities, prefix);
    config.use_english_names = english;
    let names = suggest_names(&index, &config).expect("suggestions");
    assert_eq!(names, expected);
}

#[rstest]
#[case::city(OwnerSelector::City(1), "", vec!["Leopoldstraße", "Ludwigstraße", "Marienplatz", "Sendlinger Straße"])]
#[case::city_prefix(OwnerSelector::City(1), "lu", vec!["Ludwigstraße"])]
#[case::postcode(OwnerSelector::Postcode("80331".to_owned()), "", vec!["Marienplatz"])]
fn streets_are_suggested(
    index: AddressIndex,
    #[case] owner: OwnerSelector,
    #[case] prefix: &str,
    #[case] expected: Vec<&str>,
) {
    let mut config = config(SuggestLevel::Streets, prefix);
    config.owner = Some(owner);
    let names = suggest_names(&index, &config).expect("suggestions");
    assert_eq!(names, expected);
}

#[rstest]
fn buildings_are_suggested_for_a_named_street(index: AddressIndex) {
    let mut config = config(SuggestLevel::Buildings, "1");
    config.owner = Some(OwnerSelector::City(1));
    config.street = Some("marienplatz".to_owned());
    let names = suggest_names(&index, &config).expect("suggestions");
    assert_eq!(names, vec!["12", "12A"]);
}

#[rstest]
fn unknown_owners_are_reported(index: AddressIndex) {
    let mut config = config(SuggestLevel::Streets, "");
    config.owner = Some(OwnerSelector::City(999));
    match suggest_names(&index, &config).expect_err("unknown city") {
        CliError::UnknownCity { id, region } => {
            assert_eq!(id, 999);
            assert_eq!(region, SAMPLE_REGION);
        }
        other => panic!("expected UnknownCity, found {other:?}"),
    }

    config.owner = Some(OwnerSelector::Postcode("99999".to_owned()));
    match suggest_names(&index, &config).expect_err("unknown postcode") {
        CliError::UnknownPostcode { code, .. } => assert_eq!(code, "99999"),
        other => panic!("expected UnknownPostcode, found {other:?}"),
    }
}

#[rstest]
fn unknown_streets_are_reported(index: AddressIndex) {
    let mut config = config(SuggestLevel::Buildings, "");
    config.owner = Some(OwnerSelector::City(1));
    config.street = Some("Nowhere Lane".to_owned());
    match suggest_names(&index, &config).expect_err("unknown street") {
        CliError::UnknownStreet { name } => assert_eq!(name, "Nowhere Lane"),
        other => panic!("expected UnknownStreet, found {other:?}"),
    }
}

#[rstest]
fn run_suggest_reads_the_region_file(mut args: SuggestArgs) {
    let workspace = Workspace::new();
    args.region_file = Some(workspace.region_file());
    args.level = Some(SuggestLevel::Streets);
    args.postcode = Some("12345".to_owned());

    let mut buffer = Vec::new();
    run_suggest(args, &mut buffer).expect("suggest succeeds");
    assert_eq!(output_lines(buffer), vec!["Hauptstraße"]);
}

#[rstest]
fn run_suggest_reports_missing_region_file(mut args: SuggestArgs) {
    let workspace = Workspace::new();
    args.region_file = Some(workspace.path("missing.gsrg"));
    let err = run_suggest(args, &mut Vec::new()).expect_err("missing file should error");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_REGION_FILE);
            assert_eq!(path, workspace.path("missing.gsrg"));
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn run_suggest_reports_corrupt_region_files(mut args: SuggestArgs) {
    let workspace = Workspace::new();
    let path = workspace.path("corrupt.gsrg");
    std::fs::write(&path, b"not a region file").expect("write corrupt file");
    args.region_file = Some(path);
    let err = run_suggest(args, &mut Vec::new()).expect_err("corrupt file should error");
    assert!(matches!(err, CliError::OpenRegionFile { .. }), "{err:?}");
}
