use std::io::{Read, Seek, SeekFrom, Write};

use id3_rs::id3::frames::UnsynchTextFrame;
use id3_rs::{
    CommonField, Encoding, Frame, Id3v2Tag, ParseOptions, TaggedBytes, TaggedFile, WriteOptions,
};
use tempfile::NamedTempFile;

const AUDIO: &[u8] = b"\xFF\xFB\x90\x64\x00\x0F\xF0\x00\x00\x00\x69\x00\x00\x00\x08\x00";

fn header(major: u8, size: u32) -> Vec<u8> {
    let mut out = b"ID3".to_vec();
    out.extend_from_slice(&[major, 0, 0]);
    for shift in [21, 14, 7, 0] {
        out.push(((size >> shift) & 0x7F) as u8);
    }
    out
}

fn v23_frame(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(payload);
    out
}

fn temp_file(contents: &[u8]) -> std::fs::File {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(contents).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    file
}

fn read_all(mut file: std::fs::File) -> Vec<u8> {
    let mut out = Vec::new();
    file.seek(SeekFrom::Start(0)).unwrap();
    file.read_to_end(&mut out).unwrap();
    out
}

#[test_log::test]
fn growth_relocates_trailing_bytes() {
    let mut data = header(3, 0);
    data.extend_from_slice(AUDIO);

    let mut tagged = TaggedFile::parse(temp_file(&data), ParseOptions::new()).unwrap();
    let tag = tagged.tag_mut();
    tag.set_title("A").unwrap();
    tag.set_title("Hello World").unwrap();

    // One TIT2 frame: 10 byte header, encoding byte, text
    let grown = 10 + 1 + "Hello World".len();
    assert_eq!(tag.size() as usize, grown);
    assert_eq!(tag.padding(), 0);

    tagged.commit().unwrap();
    let out = read_all(tagged.into_inner());

    assert_eq!(out.len(), data.len() + grown);
    assert_eq!(&out[10 + grown..], AUDIO);

    let reread = Id3v2Tag::from_bytes(&out, ParseOptions::new()).unwrap().unwrap();
    assert_eq!(reread.title(), "Hello World");
}

#[test_log::test]
fn growth_relocates_trailing_bytes_in_memory() {
    let mut data = header(3, 0);
    data.extend_from_slice(AUDIO);

    let mut tagged = TaggedBytes::new(data.clone(), ParseOptions::new()).unwrap();
    tagged.tag_mut().set_title("A").unwrap();
    tagged.tag_mut().set_title("Hello World").unwrap();

    let out = tagged.update_edits_into_bytes().unwrap();
    assert_eq!(out.len(), data.len() + 22);
    assert_eq!(&out[32..], AUDIO);
}

#[test_log::test]
fn large_payload_is_preserved() {
    let audio: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let mut data = header(4, 0);
    data.extend_from_slice(&audio);

    let mut tagged = TaggedFile::parse(temp_file(&data), ParseOptions::new())
        .unwrap()
        .with_write_options(WriteOptions::new().chunk_size(4096));
    tagged.tag_mut().set_album(&"x".repeat(5000)).unwrap();
    tagged.commit().unwrap();

    let out = read_all(tagged.into_inner());
    let tag = Id3v2Tag::from_bytes(&out, ParseOptions::new()).unwrap().unwrap();
    assert_eq!(tag.album().len(), 5000);
    assert_eq!(&out[tag.header().full_size() as usize..], &audio[..]);
}

#[test_log::test]
fn mixed_frames_round_trip() {
    let mut body = v23_frame(b"TIT2", b"\x01\xFF\xFET\x00i\x00t\x00l\x00e\x00");
    body.extend(v23_frame(b"PRIV", b"owner\x00\xDE\xAD\xBE\xEF"));
    body.extend(v23_frame(b"ZZZZ", b"opaque"));
    body.extend(v23_frame(b"APIC", b"\x00image/jpeg\x00\x03\x00\xFF\xD8\xFF"));
    let mut data = header(3, body.len() as u32 + 64);
    data.extend(body);
    data.resize(data.len() + 64, 0);

    let tag = Id3v2Tag::from_bytes(&data, ParseOptions::new()).unwrap().unwrap();
    assert_eq!(tag.title(), "Title");
    assert_eq!(tag.padding(), 64);

    let serialized = tag.bytes();
    let again = Id3v2Tag::from_bytes(&serialized, ParseOptions::new()).unwrap().unwrap();
    assert_eq!(again.bytes(), serialized);
    assert_eq!(&serialized[..], &data[..data.len() - 64]);
}

#[test_log::test]
fn edits_through_path() {
    let mut body = v23_frame(b"TPE1", b"\x00Old artist");
    body.extend(v23_frame(b"COMM", b"\x00engdesc\x00A comment"));
    let mut data = header(3, body.len() as u32 + 16);
    data.extend(body);
    data.resize(data.len() + 16, 0);
    data.extend_from_slice(AUDIO);

    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(&data).unwrap();
    temp.flush().unwrap();

    let mut file = TaggedFile::open(temp.path()).unwrap();
    assert_eq!(file.tag().artist(), "Old artist");
    assert_eq!(file.tag().comments(), vec!["eng\tdesc:\nA comment"]);

    file.tag_mut().set_artist("New").unwrap();
    let tag = file.tag_mut().as_v2_mut().unwrap();
    let comm = UnsynchTextFrame::new(
        tag.layout().common_type(CommonField::Comments),
        "eng",
        "",
        "Second",
        Encoding::Utf8,
    )
    .unwrap();
    tag.add_frames([Frame::from(comm)]).unwrap();
    file.close().unwrap();

    let out = std::fs::read(temp.path()).unwrap();
    assert!(out.ends_with(AUDIO));

    let reread = TaggedFile::open(temp.path()).unwrap();
    assert_eq!(reread.tag().artist(), "New");
    assert_eq!(reread.tag().comments().len(), 2);
}

#[test_log::test]
fn id3v1_is_rewritten_in_place() {
    let mut trailer = vec![0u8; 128];
    trailer[..3].copy_from_slice(b"TAG");
    trailer[3..8].copy_from_slice(b"Title");
    trailer[127] = 255;
    let mut data = AUDIO.to_vec();
    data.extend_from_slice(&trailer);

    let mut tagged = TaggedFile::parse(temp_file(&data), ParseOptions::new()).unwrap();
    assert_eq!(tagged.tag().version(), "1.0");
    assert_eq!(tagged.tag().title(), "Title");

    tagged.tag_mut().set_genre("Blues").unwrap();
    tagged.commit().unwrap();

    let out = read_all(tagged.into_inner());
    assert_eq!(out.len(), data.len());
    assert_eq!(out[out.len() - 1], 0);
    assert!(out.starts_with(AUDIO));
}

#[test_log::test]
fn untagged_file_gets_prepended_tag() {
    let mut tagged = TaggedFile::parse(temp_file(AUDIO), ParseOptions::new()).unwrap();
    assert_eq!(tagged.tag().version(), "2.3.0");
    assert!(!tagged.tag().dirty());

    tagged.tag_mut().set_year("2004").unwrap();
    tagged.commit().unwrap();

    let out = read_all(tagged.into_inner());
    let tag = Id3v2Tag::from_bytes(&out, ParseOptions::new()).unwrap().unwrap();
    assert_eq!(tag.year(), "2004");
    assert_eq!(tag.frame("TYER").unwrap().text(), Some("2004"));
    assert_eq!(&out[tag.header().full_size() as usize..], AUDIO);
}

#[test_log::test]
fn shrinking_keeps_footprint() {
    let mut body = v23_frame(b"TIT2", b"\x00A rather long title");
    body.extend(v23_frame(b"TALB", b"\x00Album"));
    let mut data = header(3, body.len() as u32);
    data.extend(body);
    data.extend_from_slice(AUDIO);

    let mut tagged = TaggedBytes::new(data.clone(), ParseOptions::new()).unwrap();
    let removed = tagged.tag_mut().delete_frames("TIT2");
    assert_eq!(removed.len(), 1);

    let out = tagged.update_edits_into_bytes().unwrap().to_vec();
    assert_eq!(out.len(), data.len());
    assert!(out.ends_with(AUDIO));

    let tag = Id3v2Tag::from_bytes(&out, ParseOptions::new()).unwrap().unwrap();
    assert_eq!(tag.title(), "");
    assert_eq!(tag.album(), "Album");
    assert_eq!(tag.padding() as usize, 10 + 20);
}
