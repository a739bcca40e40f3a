use std::io::{self, BufRead, Write};

/// Asks a yes/no question on the terminal. Outside a tty the answer is the
/// default, and every caller passes a fail-closed default: ambiguous or
/// absent input never proceeds with a mutation.
#[must_use]
pub fn confirm(question: &str, default: bool) -> bool {
    if !atty::is(atty::Stream::Stdin) {
        return default;
    }
    let suffix = if default { "[Y/n]" } else { "[y/N]" };
    eprint!("{question} {suffix}: ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return default;
    }
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}
