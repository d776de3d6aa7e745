/**
 * Checksum letters indexed by the DNI number modulo 23.
 */
const DNI_LETTERS: &[u8; 23] = b"TRWAGMYFPDXBNJZSQVHLCKE";

/**
 * Length of a DNI, eight digits followed by the checksum letter.
 */
pub const DNI_LENGTH: usize = 9;

/**
 * Checks whether a Spanish DNI is well formed and its checksum letter is correct.
 *
 * # Arguments
 * `dni`: The candidate DNI, e.g. `12345678Z`.
 *
 * # Returns
 * `true` if the first eight characters are digits and the ninth is the matching letter (any case).
 */
pub fn is_valid_dni(dni: &str) -> bool {
    let bytes = dni.as_bytes();
    if bytes.len() != DNI_LENGTH {
        return false;
    }
    let (digits, letter) = bytes.split_at(DNI_LENGTH - 1);
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let number = digits.iter().fold(0u32, |acc, digit| acc * 10 + u32::from(digit - b'0'));
    let expected = DNI_LETTERS[(number % 23) as usize];
    letter[0].to_ascii_uppercase() == expected
}

/**
 * Canonical form of a DNI as stored, with the checksum letter in upper case.
 */
pub fn normalize_dni(dni: &str) -> String {
    dni.to_ascii_uppercase()
}
