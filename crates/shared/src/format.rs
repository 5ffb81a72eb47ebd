/// Shortens a wallet address to its first and last four characters.
pub fn shorten_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    let first: String = chars.iter().take(4).collect();
    let last: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{first}...{last}")
}
