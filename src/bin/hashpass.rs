use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};

/// Mint an Argon2 PHC string for seeding app_user.password_hash.
fn main() {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("Usage: hashpass <password>");
        std::process::exit(2);
    };
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hashing failed")
        .to_string();
    println!("{phc}");
}
