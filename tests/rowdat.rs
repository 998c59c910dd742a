use s2_rowcodec::constant::ColumnType;
use s2_rowcodec::rowdat::{
    dump_column, dump_row, load_column, load_row, Blob, ColSpec, ColumnArray, ColumnView,
    MASK_FORMAT_TAG,
};
use s2_rowcodec::{Error, Value};

const TINY: i16 = ColumnType::MYSQL_TYPE_TINY as i16;
const LONG: i16 = ColumnType::MYSQL_TYPE_LONG as i16;
const LONGLONG: i16 = ColumnType::MYSQL_TYPE_LONGLONG as i16;
const VARCHAR: i16 = ColumnType::MYSQL_TYPE_VARCHAR as i16;

#[test]
fn dump_row_byte_exact() {
    // Colspec [("a", LONG), ("b", -VARCHAR)], one row: row_id=42, (7, b"xyz")
    let buffer = dump_row(
        &[LONG, -VARCHAR],
        &[42],
        &[vec![Value::Int(7), Value::Bytes(b"xyz".to_vec())]],
    )
    .unwrap();

    assert_eq!(
        buffer,
        [
            0x2A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // row id 42
            0x00, // not null
            0x07, 0x00, 0x00, 0x00, // i32 7
            0x00, // not null
            0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // length 3
            0x78, 0x79, 0x7A, // "xyz"
        ]
    );

    let (row_ids, rows) = load_row(
        &[ColSpec::new("a", LONG), ColSpec::new("b", -VARCHAR)],
        &buffer,
    )
    .unwrap();
    assert_eq!(row_ids, [42]);
    assert_eq!(rows, [vec![Value::Int(7), Value::Bytes(b"xyz".to_vec())]]);
}

#[test]
fn row_round_trip_preserves_order_and_nulls() {
    let returns = [LONGLONG, VARCHAR];
    let colspec = [ColSpec::new("n", LONGLONG), ColSpec::new("s", VARCHAR)];
    let row_ids: Vec<u64> = (0..100).collect();
    let rows: Vec<Vec<Value>> = (0..100)
        .map(|i| {
            if i % 7 == 0 {
                vec![Value::Null, Value::Null]
            } else {
                vec![Value::Int(i), Value::Str(format!("row-{i}"))]
            }
        })
        .collect();

    let buffer = dump_row(&returns, &row_ids, &rows).unwrap();
    let (decoded_ids, decoded_rows) = load_row(&colspec, &buffer).unwrap();
    assert_eq!(decoded_ids, row_ids);
    assert_eq!(decoded_rows, rows);
}

#[test]
fn null_cells_keep_fixed_strides() {
    // A NULL fixed-width cell still carries its zero payload
    let buffer = dump_row(&[LONG], &[1], &[vec![Value::Null]]).unwrap();
    assert_eq!(buffer.len(), 8 + 1 + 4);
    assert_eq!(&buffer[8..], &[0x01, 0, 0, 0, 0]);

    // A NULL string cell carries a zero length prefix
    let buffer = dump_row(&[VARCHAR], &[1], &[vec![Value::Null]]).unwrap();
    assert_eq!(buffer.len(), 8 + 1 + 8);
}

#[test]
fn misaligned_row_buffer() {
    let err = load_row(&[ColSpec::new("a", LONG)], &[0x01, 0x02]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "data length does not align with specified column values"
    );
}

#[test]
fn columnar_round_trip_with_masks() {
    let returns = [LONG, VARCHAR];
    let colspec = [ColSpec::new("n", LONG), ColSpec::new("s", VARCHAR)];

    let numbers = [5i32, 0, -9];
    let mask = [false, true, false];
    let texts = [
        Some(Blob::Text("alpha".into())),
        None,
        Some(Blob::Text("gamma".into())),
    ];

    let buffer = dump_column(
        &returns,
        &[1, 2, 3],
        &[
            (ColumnView::Int32(&numbers), Some(&mask)),
            (ColumnView::Object(&texts), Some(&mask)),
        ],
    )
    .unwrap();

    let batch = load_column(&colspec, &buffer).unwrap();
    assert_eq!(batch.row_ids, [1, 2, 3]);
    assert_eq!(batch.columns[0].data, ColumnArray::Int32(vec![5, 0, -9]));
    assert_eq!(batch.columns[0].mask, [false, true, false]);
    assert_eq!(MASK_FORMAT_TAG, '?');

    let ColumnArray::Handle(handles) = &batch.columns[1].data else {
        panic!("expected handles");
    };
    assert_eq!(
        batch.objects.get(handles[0]),
        Some(&Blob::Text("alpha".into()))
    );
    assert_eq!(handles[1], 0);
    assert_eq!(
        batch.objects.get(handles[2]),
        Some(&Blob::Text("gamma".into()))
    );
}

#[test]
fn masked_cells_decode_null_regardless_of_fill() {
    // Hand-build a row whose masked cell carries garbage fill bytes
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&1u64.to_le_bytes());
    buffer.push(0x01); // null
    buffer.extend_from_slice(&0x5A5A_5A5Au32.to_le_bytes());

    let (_, rows) = load_row(&[ColSpec::new("n", LONG)], &buffer).unwrap();
    assert_eq!(rows, [vec![Value::Null]]);

    let batch = load_column(&[ColSpec::new("n", LONG)], &buffer).unwrap();
    assert_eq!(batch.columns[0].mask, [true]);
    assert_eq!(batch.columns[0].data, ColumnArray::Int32(vec![0]));
}

#[test]
fn tinyint_range_errors() {
    let too_big = [128i16];
    let err = dump_column(&[TINY], &[1], &[(ColumnView::Int16(&too_big), None)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "value is outside the valid range for TINYINT"
    );

    let negative = [-1i64];
    let err = dump_column(&[-TINY], &[1], &[(ColumnView::Int64(&negative), None)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "value is outside the valid range for UNSIGNED TINYINT"
    );
}

#[test]
fn reserved_types_are_refused_everywhere() {
    let datetime = ColumnType::MYSQL_TYPE_DATETIME as i16;

    assert!(matches!(
        load_row(&[ColSpec::new("d", datetime)], &[]),
        Err(Error::UnsupportedType("DATETIME"))
    ));
    assert!(matches!(
        dump_row(&[datetime], &[1], &[vec![Value::Null]]),
        Err(Error::UnsupportedType("DATETIME"))
    ));
    assert!(matches!(
        load_column(&[ColSpec::new("d", datetime)], &[]),
        Err(Error::UnsupportedType("DATETIME"))
    ));
    let mask = [true];
    let cells = [None];
    assert!(matches!(
        dump_column(
            &[datetime],
            &[1],
            &[(ColumnView::Object(&cells), Some(&mask))]
        ),
        Err(Error::UnsupportedType("DATETIME"))
    ));
}

#[test]
fn strings_round_trip_utf8_and_binary_verbatim() {
    let returns = [VARCHAR, -VARCHAR];
    let colspec = [ColSpec::new("s", VARCHAR), ColSpec::new("b", -VARCHAR)];

    let rows = vec![vec![
        Value::Str("snowman ☃".into()),
        Value::Bytes(vec![0x00, 0xFF, 0x80, 0x7F]),
    ]];
    let buffer = dump_row(&returns, &[9], &rows).unwrap();
    let (_, decoded) = load_row(&colspec, &buffer).unwrap();
    assert_eq!(decoded, rows);
}

#[test]
fn invalid_utf8_in_text_column_is_an_error() {
    // Binary payload smuggled under a positive (text) code
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&1u64.to_le_bytes());
    buffer.push(0x00);
    buffer.extend_from_slice(&2i64.to_le_bytes());
    buffer.extend_from_slice(&[0xFF, 0xFE]);

    assert!(matches!(
        load_row(&[ColSpec::new("s", VARCHAR)], &buffer),
        Err(Error::Encoding { .. })
    ));
}

#[test]
fn empty_batch_is_empty_buffer() {
    assert!(dump_column(&[], &[], &[]).unwrap().is_empty());
    assert!(dump_row(&[LONG], &[], &[]).unwrap().is_empty());
}
