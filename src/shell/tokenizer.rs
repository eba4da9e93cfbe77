use snafu::Snafu;

/// Splits a command line into words.
///
/// Whitespace separates words. Single or double quotes group text, including
/// whitespace, into one word and are dropped from the result. Quoted and
/// unquoted parts directly next to each other form a single word.
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = line.chars();

    while let Some(character) = chars.next() {
        match character {
            '"' | '\'' => {
                let word = current.get_or_insert_with(String::new);
                let mut closed = false;
                for quoted in chars.by_ref() {
                    if quoted == character {
                        closed = true;
                        break;
                    }
                    word.push(quoted);
                }
                if !closed {
                    return UnterminatedQuoteSnafu { quote: character }.fail();
                }
            }
            whitespace if whitespace.is_whitespace() => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            other => current.get_or_insert_with(String::new).push(other),
        }
    }

    words.extend(current);
    Ok(words)
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum TokenizeError {
    #[snafu(display("Unterminated {} quote", quote))]
    UnterminatedQuote { quote: char },
}
