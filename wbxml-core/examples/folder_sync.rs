//! Encode a FolderSync request and pull folders out of a response.

use wbxml_core::activesync::{codepages, command_name, folder_hierarchy as fh};
use wbxml_core::{parse, EventParser, Writer, WriterConfig};

fn main() {
    let mut w = Writer::new(WriterConfig::default()).unwrap().validate_with(codepages());
    w.stag(fh::FolderSync, &[]).unwrap();
    w.tag_with_text(fh::SyncKey, &[], "0").unwrap();
    w.etag().unwrap();
    let command = w.root_tag().and_then(command_name);
    let request = w.finish().unwrap().into_vec();

    println!("Command: {:?}", command);
    let hex: Vec<String> = request.iter().map(|b| format!("{:02x}", b)).collect();
    println!("Request: {}", hex.join(" "));

    // What a server might answer.
    let mut w = Writer::new(WriterConfig::default()).unwrap();
    w.stag(fh::FolderSync, &[]).unwrap();
    w.tag_with_text(fh::Status, &[], "1").unwrap();
    w.tag_with_text(fh::SyncKey, &[], "1").unwrap();
    w.stag(fh::Changes, &[]).unwrap();
    for (id, name) in [("1", "Inbox"), ("2", "Drafts"), ("3", "Sent Items")] {
        w.stag(fh::Add, &[]).unwrap();
        w.tag_with_text(fh::ServerId, &[], id).unwrap();
        w.tag_with_text(fh::DisplayName, &[], name).unwrap();
        w.etag().unwrap();
    }
    w.etag().unwrap().etag().unwrap();
    let response = parse(&w.finish().unwrap().into_vec(), codepages()).unwrap();

    println!("Folders:");
    let mut ep = EventParser::new();
    ep.add_listener([fh::FolderSync, fh::Changes, fh::Add], |node| {
        let id = node.child(fh::ServerId).and_then(|n| n.text()).unwrap_or("?");
        let name = node.child(fh::DisplayName).and_then(|n| n.text()).unwrap_or("?");
        println!("  {:>3}  {}", id, name);
        Ok(())
    });
    ep.run(&response).unwrap();
}
