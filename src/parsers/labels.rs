//! Label tables for Chromium's numeric history and download codes.

use crate::constants::UNKNOWN_LABEL;

/// Only the core transition lives in the low byte; the rest are qualifiers.
const TRANSITION_CORE_MASK: i64 = 0xFF;

pub fn transition_label(transition: i64) -> &'static str {
    match transition & TRANSITION_CORE_MASK {
        0 => "Link",
        1 => "Typed URL",
        2 => "Auto Bookmark",
        3 => "Auto Subframe",
        4 => "Manual Subframe",
        5 => "Generated",
        6 => "Start Page",
        7 => "Form Submit",
        8 => "Reload",
        9 => "Keyword",
        10 => "Keyword Generated",
        _ => UNKNOWN_LABEL,
    }
}

pub fn danger_label(danger_type: i64) -> &'static str {
    match danger_type {
        0 => "Safe",
        1 => "Dangerous File",
        2 => "Dangerous URL",
        3 => "Dangerous Content",
        4 => "Uncommon Content",
        5 => "User Validation Required",
        6 => "Dangerous Host",
        7 => "Potentially Unwanted Program (PUP)",
        _ => UNKNOWN_LABEL,
    }
}

pub fn interrupt_label(interrupt_reason: i64) -> &'static str {
    match interrupt_reason {
        0 => "No Interrupt",
        1 => "File Error",
        2 => "Access Denied",
        3 => "Disk Full",
        5 => "Network Error",
        7 => "Virus Detected",
        10 => "Timeout",
        11 => "Canceled",
        12 => "Browser Shutdown",
        _ => UNKNOWN_LABEL,
    }
}

/// Yes/No rendering used for 0/1 flag columns.
pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_transitions_resolve() {
        let expected = [
            "Link",
            "Typed URL",
            "Auto Bookmark",
            "Auto Subframe",
            "Manual Subframe",
            "Generated",
            "Start Page",
            "Form Submit",
            "Reload",
            "Keyword",
            "Keyword Generated",
        ];
        for (code, label) in expected.iter().enumerate() {
            assert_eq!(transition_label(code as i64), *label);
        }
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(transition_label(999), "Unknown");
        assert_eq!(transition_label(0xFE), "Unknown");
        assert_eq!(danger_label(999), "Unknown");
        assert_eq!(interrupt_label(99), "Unknown");
        assert_eq!(interrupt_label(4), "Unknown");
    }

    #[test]
    fn transition_qualifiers_are_masked() {
        assert_eq!(transition_label(0x0100 | 1), "Typed URL");
        assert_eq!(transition_label(0x3000_0000 | 8), "Reload");
        assert_eq!(transition_label(0x0100 | 1), transition_label(1));
    }

    #[test]
    fn download_codes_resolve() {
        assert_eq!(danger_label(7), "Potentially Unwanted Program (PUP)");
        assert_eq!(danger_label(0), "Safe");
        assert_eq!(interrupt_label(12), "Browser Shutdown");
        assert_eq!(interrupt_label(0), "No Interrupt");
    }
}
