//! Scripted welcome lines shown when a character's transcript is empty.
//!
//! The greeting is client-held text keyed by character id, with a generic
//! fallback that borrows the character's display name. The directory
//! contract carries no greeting field, so this stays client-side.

/// Welcome line for `character_id`. `display_name` feeds the fallback for
/// ids without a scripted line.
pub fn welcome_line(character_id: &str, display_name: &str) -> String {
    match character_id {
        "alien_friend" => {
            "Greetings, earthling! I am Zara from the Andromeda galaxy. What shall we explore together?".to_string()
        }
        "wise_mentor" => {
            "Welcome, traveler. Sit a while; what questions weigh on your mind today?".to_string()
        }
        "cheerful_barista" => {
            "Hey there! Welcome in. What can I get started for you today?".to_string()
        }
        _ => format!("You are now chatting with {display_name}. Say hello!"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_ids_get_their_own_line() {
        let line = welcome_line("alien_friend", "Zara");
        assert!(line.contains("Zara"));
        assert!(line.contains("Andromeda"));
    }

    #[test]
    fn unknown_ids_fall_back_to_a_generic_line() {
        let line = welcome_line("brand_new_character", "Nova");
        assert!(line.contains("Nova"));
        assert!(line.contains("chatting with"));
    }
}
