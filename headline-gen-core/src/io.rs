use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory, once
/// - Splits on `\n` / `\r\n`
/// - Decodes each line on its own: a line that is not valid UTF-8 is
///   replaced by an empty line (logged), the rest of the file is kept
pub fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let path = filename.as_ref();
	let bytes = fs::read(path)?;
	if bytes.is_empty() {
		return Ok(Vec::new());
	}

	let body = bytes.strip_suffix(b"\n").unwrap_or(&bytes);
	let lines = body
		.split(|b| *b == b'\n')
		.enumerate()
		.map(|(index, raw)| {
			let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
			match std::str::from_utf8(raw) {
				Ok(line) => line.to_owned(),
				Err(e) => {
					log::warn!("{}:{}: treating malformed line as empty ({e})", path.display(), index + 1);
					String::new()
				}
			}
		})
		.collect();

	Ok(lines)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/train.txt` + `"bin"` → `data/train.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn read_lines_handles_crlf_and_trailing_newline() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"first line\r\nsecond line\n").unwrap();

		let lines = read_lines(file.path()).unwrap();
		assert_eq!(lines, vec!["first line".to_owned(), "second line".to_owned()]);
	}

	#[test]
	fn read_lines_keeps_empty_lines() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"a\n\nb").unwrap();

		let lines = read_lines(file.path()).unwrap();
		assert_eq!(lines, vec!["a".to_owned(), String::new(), "b".to_owned()]);
	}

	#[test]
	fn malformed_line_becomes_empty() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"good\n\xff\xfe bad\nalso good\n").unwrap();

		let lines = read_lines(file.path()).unwrap();
		assert_eq!(lines, vec!["good".to_owned(), String::new(), "also good".to_owned()]);
	}

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/train.txt", "bin").unwrap();
		assert_eq!(path, PathBuf::from("data/train.bin"));
	}
}
