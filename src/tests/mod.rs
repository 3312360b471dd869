//! Decoding whole files, from bytes to `Document`.

use std::io::Cursor;

use failure::Error as AnyError;

use crate::{
    Document, Encoding, Error, ListLenType, ReadOptions, Reader,
    parse::MAX_LINE_LEN,
    test_utils::hex_dump,
};


fn decode(src: &str) -> Result<Document, Error> {
    Document::from_reader(src.as_bytes())
}

fn check_triangle(doc: &Document) -> Result<(), AnyError> {
    assert_eq!(doc.comments(), &["made by hand".to_string()]);
    assert_eq!(doc.obj_info(), &["cube v1".to_string()]);
    assert_eq!(doc.version(), Some("1.0"));

    let names: Vec<_> = doc.elements().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["vertex", "face"]);

    let vertex = doc.element("vertex")?;
    assert_eq!(vertex.size(), 3);
    assert_eq!(vertex.value_property::<f32>("x")?.as_slice(), &[0.0, 3.0, 1.5]);
    assert_eq!(vertex.value_property::<f32>("y")?.as_slice(), &[0.0, 5.0, -2.25]);
    assert_eq!(vertex.value_property::<f32>("z")?.as_slice(), &[0.0, 8.0, 0.125]);
    assert_eq!(vertex.value_property::<u8>("red")?.as_slice(), &[255, 0, 17]);

    let face = doc.element("face")?;
    assert_eq!(face.size(), 1);
    let indices = face.list_property::<i32>("vertex_indices")?;
    assert_eq!(indices.len(), 1);
    assert_eq!(indices.row(0), &[0, 1, 2]);
    assert_eq!(indices.len_type(), ListLenType::UInt8);
    assert_eq!(indices.total_size(), 3);
    assert_eq!(indices.min_size(), 3);
    assert_eq!(indices.max_size(), 3);

    Ok(())
}

#[test]
fn triangle_ascii() -> Result<(), AnyError> {
    let doc = Document::from_reader(include_test_file!("triangle_ascii.ply"))?;
    assert_eq!(doc.encoding(), Encoding::Ascii);
    check_triangle(&doc)
}

#[test]
fn triangle_binary_little_endian() -> Result<(), AnyError> {
    let doc = Document::from_reader(include_test_file!("triangle_ble.ply"))?;
    assert_eq!(doc.encoding(), Encoding::BinaryLittleEndian);
    check_triangle(&doc)
}

#[test]
fn triangle_binary_big_endian() -> Result<(), AnyError> {
    let doc = Document::from_reader(include_test_file!("triangle_bbe.ply"))?;
    assert_eq!(doc.encoding(), Encoding::BinaryBigEndian);
    check_triangle(&doc)
}

#[test]
fn all_encodings_agree() -> Result<(), AnyError> {
    let ascii = Document::from_reader(include_test_file!("all_types_ascii.ply"))?;
    let ble = Document::from_reader(include_test_file!("all_types_ble.ply"))?;
    let bbe = Document::from_reader(include_test_file!("all_types_bbe.ply"))?;

    assert_eq!(ascii.elements(), ble.elements());
    assert_eq!(ble.elements(), bbe.elements());
    Ok(())
}

#[test]
fn all_types_values() -> Result<(), AnyError> {
    let doc = Document::from_reader(include_test_file!("all_types_ble.ply"))?;
    let values = doc.element("values")?;

    assert_eq!(values.value_property::<i8>("v_char")?.as_slice(), &[-128, 127]);
    assert_eq!(values.value_property::<u8>("v_uchar")?.as_slice(), &[255, 0]);
    assert_eq!(values.value_property::<i16>("v_short")?.as_slice(), &[-32768, 32767]);
    assert_eq!(values.value_property::<u16>("v_ushort")?.as_slice(), &[65535, 0]);
    assert_eq!(
        values.value_property::<i32>("v_int")?.as_slice(),
        &[-2147483648, 2147483647],
    );
    assert_eq!(values.value_property::<u32>("v_uint")?.as_slice(), &[4294967295, 0]);
    assert_eq!(values.value_property::<f32>("v_float")?.as_slice(), &[1.5, -3.0]);
    assert_eq!(values.value_property::<f64>("v_double")?.as_slice(), &[-0.25, 1e10]);

    Ok(())
}

#[test]
fn all_types_lists() -> Result<(), AnyError> {
    let doc = Document::from_reader(include_test_file!("all_types_bbe.ply"))?;
    let lists = doc.element("lists")?;
    assert_eq!(lists.size(), 3);

    let chars = lists.list_property::<i8>("l_char")?;
    let rows: Vec<_> = chars.iter().collect();
    assert_eq!(rows, vec![&[-1, -2][..], &[][..], &[-1, -2, -3][..]]);
    assert_eq!(chars.len_type(), ListLenType::UInt8);

    let shorts = lists.list_property::<i16>("l_short")?;
    assert_eq!(shorts.len_type(), ListLenType::UInt32);
    assert_eq!(shorts.row(2), &[-1, -2, -3]);

    let uints = lists.list_property::<u32>("l_uint")?;
    assert_eq!(uints.flat_values(), &[1, 2, 1, 2, 3]);
    assert_eq!(uints.min_size(), 0);
    assert_eq!(uints.max_size(), 3);
    assert_eq!(uints.total_size(), 5);

    let doubles = lists.list_property::<f64>("l_double")?;
    assert_eq!(doubles.len_type(), ListLenType::UInt16);
    assert_eq!(doubles.row(0), &[0.5, 1.5]);
    assert!(doubles.row(1).is_empty());

    Ok(())
}

#[test]
fn decoding_is_deterministic() -> Result<(), AnyError> {
    let a = Document::from_reader(include_test_file!("all_types_ascii.ply"))?;
    let b = Document::from_reader(include_test_file!("all_types_ascii.ply"))?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn truncated_binary_body() {
    assert_err!(
        Document::from_reader(include_test_file!("triangle_ble_truncated.ply")),
        Error::UnexpectedEndOfStream { .. }
    );
}

#[test]
fn empty_elements() -> Result<(), AnyError> {
    let doc = decode("ply\n\
        format binary_little_endian 1.0\n\
        element vertex 0\n\
        property float x\n\
        element face 0\n\
        property list uchar int vertex_indices\n\
        element nothing 4\n\
        end_header\n")?;

    let vertex = doc.element("vertex")?;
    assert_eq!(vertex.size(), 0);
    assert!(vertex.value_property::<f32>("x")?.is_empty());

    let face = doc.element("face")?;
    let indices = face.list_property::<i32>("vertex_indices")?;
    assert!(indices.is_empty());
    assert_eq!(indices.min_size(), 0);
    assert_eq!(indices.max_size(), 0);

    let nothing = doc.element("nothing")?;
    assert_eq!(nothing.size(), 4);
    assert_eq!(nothing.num_properties(), 0);

    Ok(())
}

#[test]
fn lookups_fail_with_specific_errors() -> Result<(), AnyError> {
    let doc = Document::from_reader(include_test_file!("triangle_ascii.ply"))?;
    let vertex = doc.element("vertex")?;

    assert_err!(doc.element("edge"), Error::ElementNotFound(_));
    assert_err!(vertex.property("nx"), Error::PropertyNotFound { .. });
    assert_err!(vertex.value_property::<f64>("x"), Error::TypeMismatch { .. });
    assert_err!(vertex.list_property::<f32>("x"), Error::TypeMismatch { .. });
    assert_err!(
        doc.element("face")?.value_property::<i32>("vertex_indices"),
        Error::TypeMismatch { .. }
    );

    Ok(())
}

#[test]
fn reader_exposes_header_before_body() -> Result<(), AnyError> {
    let reader = Reader::new(include_test_file!("triangle_bbe.ply"))?;
    assert_eq!(reader.encoding(), Encoding::BinaryBigEndian);

    let header = reader.header();
    assert_eq!(header.elements.len(), 2);
    assert_eq!(header.elements[0].count, 3);
    assert_eq!(header.elements[1].property_defs[0].name, "vertex_indices");

    check_triangle(&reader.read()?)
}

#[test]
fn crlf_line_endings() -> Result<(), AnyError> {
    let doc = decode("ply\r\n\
        format ascii 1.0\r\n\
        element vertex 2\r\n\
        property int a\r\n\
        end_header\r\n\
        3\r\n\
        -4\r\n")?;

    assert_eq!(doc.element("vertex")?.value_property::<i32>("a")?.as_slice(), &[3, -4]);
    Ok(())
}

#[test]
fn trailing_data_is_ignored() -> Result<(), AnyError> {
    let doc = decode("ply\n\
        format ascii 1.0\n\
        element vertex 1\n\
        property uchar a\n\
        end_header\n\
        7\n\
        this is not part of any element\n")?;

    assert_eq!(doc.element("vertex")?.value_property::<u8>("a")?.as_slice(), &[7]);
    Ok(())
}

#[test]
fn ascii_row_errors() {
    const HEADER: &str = "ply\n\
        format ascii 1.0\n\
        element vertex 2\n\
        property uchar a\n\
        property list uchar int l\n\
        end_header\n";

    let with_body = |body: &str| decode(&format!("{}{}", HEADER, body));

    // Too few values in a row.
    assert_err!(with_body("1 2 3 4\n2\n"), Error::MalformedValue { .. });

    // Values after the last property are ignored.
    assert!(with_body("1 1 5 9\n2 0 7\n").is_ok());

    // Missing row.
    assert_err!(with_body("1 0\n"), Error::UnexpectedEndOfStream { .. });

    // Not a number or out of range for the declared type.
    assert_err!(with_body("x 0\n2 0\n"), Error::MalformedValue { .. });
    assert_err!(with_body("256 0\n2 0\n"), Error::MalformedValue { .. });
    assert_err!(with_body("-1 0\n2 0\n"), Error::MalformedValue { .. });
    assert_err!(with_body("1.5 0\n2 0\n"), Error::MalformedValue { .. });

    // The list length is parsed as `uchar`.
    assert_err!(with_body("1 256\n2 0\n"), Error::MalformedValue { .. });

    assert!(with_body("1 2 -5 6\n2 0\n").is_ok());
}

#[test]
fn lenient_ascii_input() -> Result<(), AnyError> {
    let doc = decode("ply\n\
        format ascii 1.0\n\
        commentfoo bar\n\
        element v 2\n\
        property int a\n\
        end_header\n\
        5 6\n\
        7\n")?;

    assert_eq!(doc.comments(), &["foo bar".to_string()]);
    assert_eq!(doc.element("v")?.value_property::<i32>("a")?.as_slice(), &[5, 7]);
    Ok(())
}

#[test]
fn overlong_body_line() {
    let mut src = b"ply\n\
        format ascii 1.0\n\
        element v 1\n\
        property int a\n\
        end_header\n".to_vec();
    src.resize(src.len() + MAX_LINE_LEN + 1, b'1');
    src.push(b'\n');

    assert_err!(Document::from_reader(&src[..]), Error::MalformedValue { .. });
}

#[test]
fn binary_list_longer_than_body() {
    let mut src = b"ply\n\
        format binary_little_endian 1.0\n\
        element face 1\n\
        property list uchar int vertex_indices\n\
        end_header\n".to_vec();
    src.push(200);
    src.extend_from_slice(&1i32.to_le_bytes());

    assert_err!(Document::from_reader(&src[..]), Error::UnexpectedEndOfStream { .. });
}

#[test]
fn header_errors_propagate() {
    assert_err!(decode("obj\n"), Error::NotAPlyFile);
    assert_err!(decode(""), Error::NotAPlyFile);
    assert_err!(
        decode("ply\nformat ascii 1.0\nelement v 1\nproperty flaot x\nend_header\n"),
        Error::UnknownType { line: 4, .. }
    );
}

#[test]
fn file_not_found() {
    assert_err!(
        Document::open("this/file/really/does/not/exist.ply"),
        Error::FileNotFound(_)
    );
}

/// A binary file with one large element of fixed-size rows.
fn fixed_rows_file(rows: u32) -> Vec<u8> {
    let mut out = format!(
        "ply\n\
        format binary_little_endian 1.0\n\
        element vertex {}\n\
        property float x\n\
        property short y\n\
        property uchar z\n\
        property double w\n\
        end_header\n",
        rows,
    ).into_bytes();

    for i in 0..rows {
        out.extend_from_slice(&(i as f32 * 0.5).to_le_bytes());
        out.extend_from_slice(&((i % 1000) as i16 - 500).to_le_bytes());
        out.push((i % 256) as u8);
        out.extend_from_slice(&(-(i as f64)).to_le_bytes());
    }
    out
}

#[test]
fn parallel_and_sequential_decode_agree() -> Result<(), AnyError> {
    let src = fixed_rows_file(5000);

    let parallel = Reader::new(Cursor::new(&src))?
        .with_options(ReadOptions { parallel: true, parallel_min_rows: 0 })
        .read()?;
    let sequential = Reader::new(Cursor::new(&src))?
        .with_options(ReadOptions { parallel: false, ..ReadOptions::default() })
        .read()?;

    if parallel != sequential {
        panic!("decoded documents differ for input:\n{}", hex_dump(&src[..256]));
    }

    let vertex = parallel.element("vertex")?;
    assert_eq!(vertex.size(), 5000);
    let y = vertex.value_property::<i16>("y")?;
    assert_eq!(y[0], -500);
    assert_eq!(y[1999], 499);
    assert_eq!(vertex.value_property::<u8>("z")?[4099], 3);
    assert_eq!(vertex.value_property::<f64>("w")?[4999], -4999.0);
    assert_eq!(vertex.value_property::<f32>("x")?[10], 5.0);

    Ok(())
}

#[test]
fn fixed_rows_then_list_element() -> Result<(), AnyError> {
    // The block read of the first element must leave the input exactly at
    // the start of the second one.
    let mut src = b"ply\n\
        format binary_big_endian 1.0\n\
        element vertex 2\n\
        property ushort a\n\
        element face 2\n\
        property list ushort uchar b\n\
        end_header\n".to_vec();
    src.extend_from_slice(&[0x01, 0x02, 0xff, 0xfe]);
    src.extend_from_slice(&[0x00, 0x01, 0x09, 0x00, 0x00]);

    let doc = Reader::new(&src[..])?
        .with_options(ReadOptions { parallel: true, parallel_min_rows: 0 })
        .read()?;

    assert_eq!(doc.element("vertex")?.value_property::<u16>("a")?.as_slice(), &[0x0102, 0xfffe]);
    let b = doc.element("face")?.list_property::<u8>("b")?;
    assert_eq!(b.row(0), &[9]);
    assert!(b.row(1).is_empty());

    Ok(())
}
