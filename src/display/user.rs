//! User display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::User;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Mobile")]
    mobile: String,
}

/// Format a list of users as a table
pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let rows = users.iter().map(|u| UserRow {
        id: u.id.to_string(),
        username: u.username.clone(),
        email: if u.email.is_empty() {
            "-".to_string()
        } else {
            u.email.clone()
        },
        mobile: u.mobile_number.clone(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a single user's details
pub fn format_user_details(user: &User) -> String {
    let mut output = String::new();

    output.push_str(&format!("User: {}\n", user.username));
    output.push_str(&format!("  ID:             {}\n", user.id));
    if !user.email.is_empty() {
        output.push_str(&format!("  Email:          {}\n", user.email));
    }
    output.push_str(&format!("  Mobile:         {}\n", user.mobile_number));
    output.push_str(&format!(
        "  Registered:     {}\n",
        user.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        assert_eq!(format_user_list(&[]), "No users found.");
    }

    #[test]
    fn test_list_contains_users() {
        let users = vec![
            User::with_email("alice", "alice@example.com", "5551234"),
            User::new("bob", "5559876"),
        ];
        let output = format_user_list(&users);

        assert!(output.contains("Username"));
        assert!(output.contains("alice@example.com"));
        assert!(output.contains("bob"));
        assert!(output.contains(&users[0].id.to_string()));
    }

    #[test]
    fn test_details_skip_empty_email() {
        let output = format_user_details(&User::new("bob", "5559876"));
        assert!(output.contains("User: bob"));
        assert!(!output.contains("Email"));
    }
}
