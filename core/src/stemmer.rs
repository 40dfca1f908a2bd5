//! Light Turkish suffix stripping: at most one suffix from each of three
//! ordered groups, single pass, length-guarded.

/// Case endings, tried in order; the first match is stripped.
const CASE_SUFFIXES: [&[u8]; 16] = [
    b"nda", b"nde", b"dan", b"den", b"nin", b"nun", b"nan", b"nen", b"yi", b"yu", b"ya", b"ye",
    b"da", b"de", b"ta", b"te",
];

/// Strips suffixes from a folded token in place. Tokens shorter than five
/// bytes are left alone. Returns whether the buffer changed.
///
/// Groups, each applied at most once:
/// 1. plural `lar`/`ler`;
/// 2. possessive `im`/`in`/`um`/`un`: always two trailing bytes, whichever
///    of the four matched;
/// 3. the first matching case ending, when at least four bytes remain.
///
/// One call strips one suffix per group, so `evlerde` comes out as `evler`,
/// not `ev`.
pub fn stem(token: &mut Vec<u8>) -> bool {
    if token.len() < 5 {
        return false;
    }
    let mut modified = false;

    if token.ends_with(b"lar") || token.ends_with(b"ler") {
        token.truncate(token.len() - 3);
        modified = true;
    }

    if token.len() >= 4
        && (token.ends_with(b"im")
            || token.ends_with(b"in")
            || token.ends_with(b"um")
            || token.ends_with(b"un"))
    {
        token.truncate(token.len() - 2);
        modified = true;
    }

    if token.len() >= 4 {
        for suffix in CASE_SUFFIXES {
            if token.ends_with(suffix) {
                token.truncate(token.len() - suffix.len());
                modified = true;
                break;
            }
        }
    }

    modified
}
