use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CODE_LENGTH: usize = 6;

pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Draw codes until `exists` reports one that no active room holds.
pub fn generate_unique_room_code<F>(exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let code = generate_room_code();
        if !exists(&code) {
            return code;
        }
    }
}
