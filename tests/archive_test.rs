use frametar::tar::{calc_checksum, BLOCK_SIZE};
use frametar::{archive_pairs, Tarball, TarError};
use proptest::prelude::*;

struct Decoded {
    name: String,
    size: usize,
    checksum: u32,
    header: [u8; BLOCK_SIZE],
    data: Vec<u8>,
}

fn read_octal(field: &[u8]) -> u64 {
    let s: String = field
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    u64::from_str_radix(s.trim(), 8).unwrap()
}

/// Walks the archive header by header until the end-of-archive marker.
fn decode(archive: &[u8]) -> Vec<Decoded> {
    let mut entries = Vec::new();
    let mut offset = 0;
    while offset + BLOCK_SIZE <= archive.len() {
        let block = &archive[offset..offset + BLOCK_SIZE];
        if block.iter().all(|&b| b == 0) {
            break;
        }
        let mut header = [0u8; BLOCK_SIZE];
        header.copy_from_slice(block);
        let name_end = header[..100].iter().position(|&b| b == 0).unwrap_or(100);
        let name = header[..name_end].iter().map(|&b| b as char).collect();
        let size = read_octal(&header[124..136]) as usize;
        let checksum = read_octal(&header[148..156]) as u32;
        let data_start = offset + BLOCK_SIZE;
        let data = archive[data_start..data_start + size].to_vec();
        entries.push(Decoded {
            name,
            size,
            checksum,
            header,
            data,
        });
        offset = data_start + size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    }
    // exactly the marker remains
    assert_eq!(archive.len() - offset, 1024);
    entries
}

#[test]
fn names_come_back_in_insertion_order() {
    let names = ["2.png", "0.png", "1.png", "0.png"];
    let mut tar = Tarball::with_mtime(1_700_000_000);
    for (i, name) in names.iter().enumerate() {
        tar.add_file(*name, vec![i as u8; i * 300]).unwrap();
    }
    let archive = tar.generate().unwrap();
    let decoded = decode(archive.as_bytes());
    let got: Vec<_> = decoded.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(got, names);
    for (i, e) in decoded.iter().enumerate() {
        assert_eq!(e.size, i * 300);
        assert!(e.data.iter().all(|&b| b == i as u8));
        assert_eq!(read_octal(&e.header[136..148]), 1_700_000_000);
    }
}

#[test]
fn non_ascii_name_is_rejected() {
    let mut tar = Tarball::new();
    let err = tar.add_file("\u{0100}.png", b"x".to_vec()).unwrap_err();
    assert!(matches!(err, TarError::NonAsciiName { ch: '\u{0100}', .. }));
    assert!(matches!(tar.generate(), Err(TarError::EmptyArchive)));
}

#[test]
fn frame_sequence_archive() {
    let frames = (0..120).map(|i| (frametar::frame_name(i, 120), vec![0xABu8; 1000 + i]));
    let archive = archive_pairs(frames).unwrap();
    let decoded = decode(archive.as_bytes());
    assert_eq!(decoded.len(), 120);
    assert_eq!(decoded[0].name, "000.png");
    assert_eq!(decoded[119].name, "119.png");
    assert_eq!(decoded[42].size, 1042);
}

proptest! {
    #[test]
    fn archive_layout(files in prop::collection::vec(("[a-z0-9_.]{1,100}", prop::collection::vec(any::<u8>(), 0..1500)), 1..8)) {
        let mut tar = Tarball::with_mtime(0);
        for (name, content) in &files {
            tar.add_file(name.as_str(), content.clone()).unwrap();
        }
        let archive = tar.generate().unwrap();
        let bytes = archive.as_bytes();

        prop_assert_eq!(bytes.len() % BLOCK_SIZE, 0);
        prop_assert!(bytes[bytes.len() - 1024..].iter().all(|&b| b == 0));
        let expected: usize = files
            .iter()
            .map(|(_, c)| BLOCK_SIZE + c.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE)
            .sum();
        prop_assert_eq!(bytes.len(), expected + 1024);

        let decoded = decode(bytes);
        prop_assert_eq!(decoded.len(), files.len());
        for (e, (name, content)) in decoded.iter().zip(&files) {
            prop_assert_eq!(&e.name, name);
            prop_assert_eq!(&e.data, content);
            prop_assert_eq!(e.checksum, calc_checksum(&e.header));
            prop_assert_eq!(&e.header[154..156], b"\0 ");
        }
    }

    #[test]
    fn single_entry_block_length(size in 0usize..5000) {
        let mut tar = Tarball::with_mtime(0);
        tar.add_file("f", vec![1u8; size]).unwrap();
        let entry = &tar.entries()[0];
        prop_assert_eq!(entry.block_len(), 512 + size.div_ceil(512) * 512);
        prop_assert_eq!(tar.generate().unwrap().len(), entry.block_len() + 1024);
    }
}
