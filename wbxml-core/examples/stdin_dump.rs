//! Dump a WBXML document read from stdin.
//!
//! `cargo run --example stdin_dump [-- --lenient] < message.wbxml`

use std::io::Read;

use wbxml_core::activesync::codepages;
use wbxml_core::{dump, DumpOptions, Reader, ReaderOptions};

fn main() {
    let lenient = std::env::args().any(|a| a == "--lenient");
    let options = if lenient { ReaderOptions::lenient() } else { ReaderOptions::default() };

    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input).unwrap();

    match Reader::with_options(codepages(), options).parse(&input) {
        Ok(doc) => print!("{}", dump(&doc, codepages(), &DumpOptions { header: true, ..Default::default() })),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
