use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  url: {}", self.url());
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => println!("  username: {username}"),
            _ => println!("  username: (unset)"),
        }
        match &self.auth_token {
            Some(token) if !token.is_empty() => println!("  auth-token: {}", mask_token(token)),
            _ => println!("  auth-token: (unset, read-only session)"),
        }
        if self.highlighted.is_empty() {
            println!("  highlighted: (none set)");
        } else {
            println!("  highlighted: {}", self.highlighted.join(", "));
        }
        match self.show_join_leave() {
            true => println!("  show-join-leave: on"),
            false => println!("  show-join-leave: off"),
        }
        println!("  scrollback: {}", self.scrollback());
        println!("  event-capacity: {}", self.event_capacity());
        println!(
            "  startup-poll: {}ms",
            self.startup_poll_interval().as_millis()
        );
        match self.startup_timeout() {
            Some(timeout) => println!("  startup-timeout: {}s", timeout.as_secs()),
            None => println!("  startup-timeout: (wait forever)"),
        }
    }
}

pub(crate) fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}…")
    }
}
