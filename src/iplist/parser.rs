//! Address file parsing.
//!
//! The file format is one textual IP address (v4 or v6) per line. Any line
//! that is not a bare address is skipped, which makes `#` comments and blank
//! separators work without a comment syntax.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;

use crate::error::{ListError, ListResult};

/// Load every address listed in `path`.
///
/// A missing file (or a path that is a directory) yields an empty list.
/// I/O failures on an existing file are returned and no partial result is kept.
pub fn load_addresses(path: &Path) -> ListResult<Vec<IpAddr>> {
    if !exists_and_not_dir(path) {
        tracing::debug!(path = %path.display(), "IP file not found, nothing to match");
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(|source| ListError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    parse_addresses(BufReader::new(file)).map_err(|source| ListError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse addresses from any buffered reader, dropping lines that don't parse.
///
/// Lines are read as raw bytes, so a line that is not UTF-8 is just another
/// unparseable line. Only errors from the reader itself are returned.
pub fn parse_addresses<R: BufRead>(mut reader: R) -> std::io::Result<Vec<IpAddr>> {
    let mut addresses = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(addresses);
        }
        if let Some(ip) = parse_line(&line) {
            addresses.push(ip);
        }
    }
}

fn parse_line(line: &[u8]) -> Option<IpAddr> {
    // Tolerate CRLF files; anything else must be the bare address.
    let line = line.strip_suffix(&b"\n"[..]).unwrap_or(line);
    let line = line.strip_suffix(&b"\r"[..]).unwrap_or(line);
    std::str::from_utf8(line).ok()?.parse().ok()
}

fn exists_and_not_dir(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|meta| !meta.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let input = "# banned hosts\n10.0.0.1\n\n  \nnot an ip\n2001:db8::1\n10.0.0.2\n";
        let ips = parse_addresses(Cursor::new(input)).unwrap();

        assert_eq!(
            ips,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "2001:db8::1".parse().unwrap(),
                "10.0.0.2".parse().unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_ranges_and_padding() {
        // Only exact addresses are supported, no CIDR or surrounding whitespace.
        let input = "10.0.0.0/8\n 10.0.0.5\n10.0.0.6 # trailing\n";
        let ips = parse_addresses(Cursor::new(input)).unwrap();
        assert!(ips.is_empty());
    }

    #[test]
    fn test_parse_crlf_lines() {
        let ips = parse_addresses(Cursor::new("192.168.1.1\r\n192.168.1.2\r\n")).unwrap();
        assert_eq!(ips.len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ips = load_addresses(&dir.path().join("absent.txt")).unwrap();
        assert!(ips.is_empty());
    }

    #[test]
    fn test_directory_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let ips = load_addresses(dir.path()).unwrap();
        assert!(ips.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "10.0.0.1\n10.0.0.2\n").unwrap();

        let ips = load_addresses(&path).unwrap();
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[0], "10.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_non_utf8_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"# M\xfcller\n10.0.0.1\n\xff\xfe\n10.0.0.2").unwrap();

        let ips = load_addresses(&path).unwrap();
        assert_eq!(
            ips,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "10.0.0.2".parse().unwrap(),
            ]
        );
    }

    #[test]
    fn test_zoned_ipv6_is_skipped() {
        let ips = parse_addresses(Cursor::new("fe80::1%eth0\nfe80::1\n")).unwrap();
        assert_eq!(ips, vec!["fe80::1".parse::<IpAddr>().unwrap()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        std::fs::create_dir(&target).unwrap();
        let path = dir.path().join("list.txt");
        std::os::unix::fs::symlink(&target, &path).unwrap();

        let err = load_addresses(&path).unwrap_err();
        assert!(matches!(err, ListError::Read { .. }));
    }
}
