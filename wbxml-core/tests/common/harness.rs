//! Test harness: fixture checks and writer/reader round trips

use crate::common::{Gen, Op, TestCase};
use wbxml_core::activesync::codepages;
use wbxml_core::{
    dump, parse, DumpOptions, Element, ElementKind, Node, Writer, WriterConfig,
};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: Vec<u8>,
    pub expected: String,
    pub actual: String,
    pub seed: u64,
    pub errors: Vec<String>,
}

/// Encode writer calls
pub fn write_ops(ops: &[Op]) -> Vec<u8> {
    let mut w = Writer::new(WriterConfig::default()).expect("default config");
    for op in ops {
        let result = match op {
            Op::Start(tag) => w.stag(*tag, &[]).map(|_| ()),
            Op::Empty(tag) => w.tag(*tag, &[]).map(|_| ()),
            Op::Text(s) => w.text(s.as_str()).map(|_| ()),
            Op::End => w.etag().map(|_| ()),
        };
        result.unwrap_or_else(|e| panic!("writer rejected {:?}: {}", op, e));
    }
    w.finish().expect("balanced document").into_vec()
}

/// Nodes the reader should produce for `ops`
pub fn expected_nodes(ops: &[Op]) -> Vec<Node> {
    ops.iter()
        .map(|op| match op {
            Op::Start(tag) => Node::Element(Element::new(ElementKind::Start, *tag)),
            Op::Empty(tag) => Node::Element(Element::new(ElementKind::Empty, *tag)),
            Op::Text(s) => Node::Text(s.clone()),
            Op::End => Node::EndTag,
        })
        .collect()
}

/// Run a fixture case against the ActiveSync codepages
pub fn run_test(case: &TestCase) -> TestResult {
    let input = case.bytes();
    let mut errors = Vec::new();

    let (expected, actual) = match (parse(&input, codepages()), &case.error, &case.dump) {
        (Ok(doc), None, Some(want)) => {
            let got = dump(&doc, codepages(), &DumpOptions::default());
            if &got != want {
                errors.push("dump mismatch".to_string());
            }
            (want.clone(), got)
        }
        (Err(e), Some(want), _) => {
            let got = e.to_string();
            if !got.contains(want.as_str()) {
                errors.push(format!("error {:?} does not contain {:?}", got, want));
            }
            (want.clone(), got)
        }
        (Ok(doc), Some(want), _) => {
            errors.push("expected an error".to_string());
            (want.clone(), dump(&doc, codepages(), &DumpOptions::default()))
        }
        (Err(e), None, _) => {
            errors.push("unexpected error".to_string());
            (case.dump.clone().unwrap_or_default(), e.to_string())
        }
        (Ok(_), None, None) => {
            errors.push("fixture has neither dump nor error".to_string());
            (String::new(), String::new())
        }
    };

    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed: 0,
        errors,
    }
}

/// Write a generated document, read it back, compare node lists
pub fn run_roundtrip(gen: &mut Gen) -> TestResult {
    let ops = gen.document();
    let input = write_ops(&ops);
    let expected = expected_nodes(&ops);
    let mut errors = Vec::new();

    let actual = match parse(&input, codepages()) {
        Ok(doc) => {
            if doc.nodes != expected {
                errors.push("node mismatch".to_string());
            }
            format!("{:#?}", doc.nodes)
        }
        Err(e) => {
            errors.push(format!("reader failed: {}", e));
            String::new()
        }
    };

    TestResult {
        passed: errors.is_empty(),
        input,
        expected: format!("{:#?}", expected),
        actual,
        seed: gen.seed,
        errors,
    }
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set WBXML_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        for line in self.input.chunks(16) {
            let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
            eprintln!("  {}", hex.join(" "));
        }
        eprintln!("\nExpected:\n{}", self.expected);
        eprintln!("\nActual:\n{}", self.actual);
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
