// ✏️ Formatter - Input masking for CPF and phone fields
// Display form is always derived from the digit-only storage form
//
// Both masks are progressive: every partial prefix is already formatted,
// so they can be applied on each keystroke.
// Input with MORE digits than a full value is passed through verbatim.

/// Maximum digit count accepted by either mask
pub const MAX_MASKED_DIGITS: usize = 11;

/// Strip every non-digit character
///
/// Used before any validation, storage, or lookup.
pub fn to_storage_form(formatted: &str) -> String {
    formatted.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Mask a CPF as `000.000.000-00`
///
/// Example: "12345678901" → "123.456.789-01", "1234" → "123.4"
pub fn format_identifier(raw: &str) -> String {
    let digits = to_storage_form(raw);
    if digits.len() > MAX_MASKED_DIGITS {
        return raw.to_string();
    }

    let mut out = String::with_capacity(14);
    for (i, c) in digits.chars().enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Mask a phone number as `(00) 0000-0000` or `(00) 00000-0000`
///
/// The hyphen always sits before the last 4 digits of a complete number:
/// an 8-digit local part splits 4-4, a 9-digit (mobile) local part splits 5-4.
pub fn format_phone(raw: &str) -> String {
    let digits = to_storage_form(raw);
    if digits.len() > MAX_MASKED_DIGITS {
        return raw.to_string();
    }
    if digits.len() <= 2 {
        return digits;
    }

    let (area, local) = digits.split_at(2);
    let hyphen_at = if local.len() > 8 { 5 } else { 4 };

    let mut out = format!("({}) ", area);
    if local.len() > hyphen_at {
        out.push_str(&local[..hyphen_at]);
        out.push('-');
        out.push_str(&local[hyphen_at..]);
    } else {
        out.push_str(local);
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================
