use spotmig::management::{
    SourceError,
    library::{parse_items, require_columns},
};

#[test]
fn test_parse_items_exportify_table() {
    let data = b"Track URI,Track Name,Artist Name(s),Album Name,Duration (ms)\n\
spotify:track:1,Song,\"Band, Friend\",Record,200000\n\
spotify:track:2,Other,Band,Record,180000\n";

    let items = parse_items(data).unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].identifier, "spotify:track:1");
    assert_eq!(items[0].title, "Song");
    assert_eq!(items[0].artist, "Band, Friend");
    assert_eq!(items[0].album, "Record");
}

#[test]
fn test_parse_items_trims_header_names() {
    let data = b" Track URI , Track Name,Artist Name(s) ,Album Name\nspotify:track:1,Song,Band,Record\n";
    let items = parse_items(data).unwrap();
    assert_eq!(items[0].identifier, "spotify:track:1");
}

#[test]
fn test_parse_items_skips_empty_and_repeated_identifiers() {
    let data = b"Track URI,Track Name,Artist Name(s),Album Name\n\
spotify:track:1,Song,Band,Record\n\
,Local file,Me,Demos\n\
spotify:track:1,Song (dup),Band,Record\n\
spotify:track:2,Other,Band,Record\n";

    let items = parse_items(data).unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.identifier.as_str()).collect();

    assert_eq!(ids, vec!["spotify:track:1", "spotify:track:2"]);
    assert_eq!(items[0].title, "Song");
}

#[test]
fn test_parse_items_missing_columns() {
    let data = b"Track URI,Track Name\nspotify:track:1,Song\n";

    match parse_items(data) {
        Err(SourceError::MissingColumns(cols)) => {
            assert_eq!(cols, vec!["Artist Name(s)".to_string(), "Album Name".to_string()])
        }
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn test_require_columns_positions() {
    let headers = csv::StringRecord::from(vec!["a", " b ", "c"]);
    assert_eq!(require_columns(&headers, &["c", "b"]).unwrap(), vec![2, 1]);
}
