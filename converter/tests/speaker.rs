use converter::SpeakerConfig;
use converter::speaker::{SpeakerParser, SpeakerSplit};

fn parser() -> SpeakerParser {
    SpeakerParser::new(&SpeakerConfig::default())
}

fn speaker(name: &str, body: usize) -> SpeakerSplit {
    SpeakerSplit::Speaker {
        name: name.to_string(),
        body,
    }
}

#[test]
fn name_and_text() {
    assert_eq!(parser().split("Alice: Hello"), speaker("Alice", 6));
    assert_eq!(parser().split("  Bob :  Hey"), speaker("Bob", 7));
    assert_eq!(parser().split("Alice:"), speaker("Alice", 6));
}

#[test]
fn parenthetical_names() {
    assert_eq!(
        parser().split("Bob (quietly): hi"),
        speaker("Bob (quietly)", 14)
    );
}

#[test]
fn no_separator() {
    assert_eq!(
        parser().split("Just some narration"),
        SpeakerSplit::NoSpeaker { body: 0 }
    );
}

#[test]
fn separator_must_end_a_word() {
    assert_eq!(
        parser().split("Meet me at 10:30 tonight"),
        SpeakerSplit::NoSpeaker { body: 0 }
    );
    assert_eq!(
        parser().split("See https://example.com"),
        SpeakerSplit::NoSpeaker { body: 0 }
    );
}

#[test]
fn sentence_end_stops_the_search() {
    assert_eq!(
        parser().split("Wait. Then: go"),
        SpeakerSplit::NoSpeaker { body: 0 }
    );
    assert_eq!(
        parser().split("Really? Yes: really"),
        SpeakerSplit::NoSpeaker { body: 0 }
    );
}

#[test]
fn escaped_separator() {
    assert_eq!(
        parser().split(r"Note\: not a speaker"),
        SpeakerSplit::NoSpeaker { body: 0 }
    );
}

#[test]
fn empty_name_drops_separator() {
    assert_eq!(parser().split(": hi"), SpeakerSplit::NoSpeaker { body: 1 });
}

#[test]
fn long_or_punctuated_prefixes_are_ambiguous() {
    assert_eq!(
        parser().split("The old man who lived here: hello"),
        SpeakerSplit::Ambiguous {
            prefix: "The old man who lived here".to_string()
        }
    );
    assert_eq!(
        parser().split("Alice, Bob, and Carol, : hi"),
        SpeakerSplit::Ambiguous {
            prefix: "Alice, Bob, and Carol,".to_string()
        }
    );
    assert_eq!(
        parser().split("42: hi"),
        SpeakerSplit::Ambiguous {
            prefix: "42".to_string()
        }
    );
}

#[test]
fn custom_separators() {
    let parser = SpeakerParser::new(&SpeakerConfig {
        separators: vec![':', '>'],
        max_words: 1,
    });
    assert_eq!(parser.split("Eileen> hi"), speaker("Eileen", 7));
    assert!(!parser.split("Eileen Smith: hi").is_speaker());
}
