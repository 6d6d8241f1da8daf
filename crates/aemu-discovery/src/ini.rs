//! Reader for the flat `key=value` files emulators leave in their discovery
//! directory. There are no sections, comments or quoting.

use std::{collections::BTreeMap, fs, io, path::Path};

pub fn parse_ini_str(contents: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    // `\n`, `\r\n` and bare `\r` all end a line.
    for line in contents.split(['\n', '\r']) {
        let line = line.trim();
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.to_string(), value.to_string());
        }
    }
    values
}

pub fn parse_ini_file(path: &Path) -> io::Result<BTreeMap<String, String>> {
    let raw = fs::read(path)?;
    Ok(parse_ini_str(&String::from_utf8_lossy(&raw)))
}
