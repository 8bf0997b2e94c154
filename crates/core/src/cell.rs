// A1-style cell addressing for snapshot cells.

/// Spreadsheet column letter for a 0-based column index (0 → A, 26 → AA).
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// A1 address for a 1-based sheet row and 0-based column index.
pub fn address(sheet_row: usize, column_index: usize) -> String {
    format!("{}{}", column_letter(column_index), sheet_row)
}
