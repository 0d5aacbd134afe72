use crate::Error;
use crate::text::Replacer;

/// Replace `current` with `new` in the null-padded placeholder fields of `data`, preserving the
/// length of every field and therefore of the whole buffer.
///
/// At build time, `original` was embedded in a field of `len(original)` bytes followed by at
/// least one null byte. An install (or previous relocation) replaced it with `current`, padding
/// with nulls to keep the field width, so each field now looks like:
///
/// ```text
/// |-----------------------original placeholder-----------------|somestring?|0|
/// |--------current placeholder--------|somestring?|00000000000000000000000000|
/// |------------new placeholder--------------|somestring?|0000000000000000000|
/// ```
///
/// A field is `current`, followed by any number of non-null bytes (e.g., the remainder of a path
/// such as `/lib/python3.12`), followed by one or more null bytes. Fields are matched left to right
/// and never overlap; every occurrence of `current` within the non-null part of a field (nested
/// paths, like `RPATH` lists) is replaced, the rest is kept verbatim, and the field is padded back
/// to its original width with nulls.
///
/// Occurrences of `current` that are part of an occurrence of `new` (when one prefix contains the
/// other) are considered relocated already and are left untouched.
pub fn binary_replace(
    data: &[u8],
    original: &str,
    current: &str,
    new: &str,
) -> Result<Vec<u8>, Error> {
    if new.len() > original.len() {
        return Err(Error::PlaceholderTooLong {
            original: original.to_string(),
            new: new.to_string(),
        });
    }
    if current.is_empty() {
        return Err(Error::EmptyPlaceholder);
    }
    if current.len() > original.len() {
        return Err(Error::CapacityExceeded {
            original: original.to_string(),
            current: current.to_string(),
        });
    }

    let replacer = Replacer::new(current.as_bytes(), new.as_bytes());
    let mut output = Vec::with_capacity(data.len());
    // The end of the last field, i.e., the bytes of `data` already accounted for in `output`.
    let mut cursor = 0;

    while let Some(start) = replacer.find_iter(data, cursor..data.len()).next() {
        let value_start = start + current.len();

        // Without a null terminator, neither this nor any later occurrence is a field.
        let Some(terminator) = memchr::memchr(0, &data[value_start..]) else {
            break;
        };
        let value_end = value_start + terminator;
        let padding = data[value_end..]
            .iter()
            .take_while(|&&byte| byte == 0)
            .count();
        let end = value_end + padding;
        let capacity = end - start;

        let replaced = replacer.replace(data, start..value_end);
        if replaced.len() > capacity {
            return Err(Error::PaddingOverflow {
                offset: start,
                capacity,
            });
        }

        output.extend_from_slice(&data[cursor..start]);
        output.extend_from_slice(&replaced);
        output.resize(output.len() + capacity - replaced.len(), 0);
        cursor = end;
    }
    output.extend_from_slice(&data[cursor..]);

    assert_eq!(
        output.len(),
        data.len(),
        "binary replacement must preserve the length of the data"
    );
    Ok(output)
}
