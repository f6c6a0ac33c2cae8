// src/fetch/links.rs
// =============================================================================
// This module finds <a href="..."> targets in HTML, incrementally.
//
// Instead of parsing the whole page into a DOM (what `scraper` does), we drive
// the html5ever *tokenizer* directly. The tokenizer emits one token per tag
// and we only look at <a> start tags. That means:
// - we can feed the body chunk by chunk, as it arrives from the network
// - links come out in document order, as soon as their tag is complete
// - nothing but the list of pending links is kept in memory
//
// Bytes are decoded as UTF-8; a multi-byte character split across two
// network chunks is held back until the next chunk completes it.
//
// Rust concepts:
// - Traits: we implement html5ever's TokenSink trait to receive tokens
// - std::mem::take: move the found links out, leaving an empty Vec behind
// =============================================================================

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

// Receives tokens from the tokenizer and remembers href values
#[derive(Default)]
struct AnchorSink {
    found: Vec<String>,
}

impl TokenSink for AnchorSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            match &*name {
                "a" => {
                    let href = attrs
                        .iter()
                        .find(|attr| &*attr.name.local == "href")
                        .map(|attr| attr.value.trim().to_string());
                    if let Some(href) = href.filter(|h| !h.is_empty()) {
                        self.found.push(href);
                    }
                }
                // Without a tree builder nobody tells the tokenizer that
                // these elements hold raw text, so "<a" inside a script
                // would otherwise look like a tag
                "script" => return TokenSinkResult::RawData(RawKind::ScriptData),
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                    return TokenSinkResult::RawData(RawKind::Rawtext)
                }
                "title" | "textarea" => return TokenSinkResult::RawData(RawKind::Rcdata),
                _ => {}
            }
        }
        TokenSinkResult::Continue
    }
}

/// Incremental link extractor.
///
/// Feed it raw body bytes with [`LinkExtractor::feed`]; each call returns the
/// links completed by that chunk. Call [`LinkExtractor::finish`] once the body
/// has ended to flush whatever the tokenizer was still holding.
pub struct LinkExtractor {
    tokenizer: Tokenizer<AnchorSink>,
    input: BufferQueue,
    // Trailing bytes of an incomplete UTF-8 sequence
    pending: Vec<u8>,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(AnchorSink::default(), TokenizerOpts::default()),
            input: BufferQueue::new(),
            pending: Vec::new(),
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.decode(chunk);
        if !text.is_empty() {
            self.input.push_back(StrTendril::from_slice(&text));
            let _ = self.tokenizer.feed(&mut self.input);
        }
        std::mem::take(&mut self.tokenizer.sink.found)
    }

    pub fn finish(mut self) -> Vec<String> {
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.input.push_back(StrTendril::from_slice(&rest));
            let _ = self.tokenizer.feed(&mut self.input);
        }
        self.tokenizer.end();
        std::mem::take(&mut self.tokenizer.sink.found)
    }

    // Turns the next chunk into text, keeping an incomplete trailing
    // character for later and replacing invalid bytes with U+FFFD
    fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut text = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    text.push_str(
                        std::str::from_utf8(&self.pending[..valid_up_to]).unwrap_or_default(),
                    );
                    match e.error_len() {
                        Some(bad) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + bad);
                        }
                        None => {
                            self.pending.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }
        text
    }
}

/// Extracts every link from a complete document in one go.
#[cfg(test)]
pub fn extract_links(html: &str) -> Vec<String> {
    let mut extractor = LinkExtractor::new();
    let mut links = extractor.feed(html.as_bytes());
    links.extend(extractor.finish());
    links
}
