#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .split_whitespace()
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_login()
            || cmd.is_logout()
            || cmd.is_docs()
            || cmd.is_upload()
            || cmd.is_bulk_upload()
            || cmd.is_cancel()
            || cmd.is_reject()
            || cmd.is_notifications()
            || cmd.is_tasks()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_login(&self) -> bool {
        return self.command == "/login";
    }

    pub fn is_logout(&self) -> bool {
        return self.command == "/logout";
    }

    pub fn is_docs(&self) -> bool {
        return ["/d", "/docs"].contains(&self.command.as_str());
    }

    pub fn is_upload(&self) -> bool {
        return ["/u", "/upload"].contains(&self.command.as_str());
    }

    pub fn is_bulk_upload(&self) -> bool {
        return ["/b", "/bulk"].contains(&self.command.as_str());
    }

    pub fn is_cancel(&self) -> bool {
        return ["/c", "/cancel"].contains(&self.command.as_str());
    }

    pub fn is_reject(&self) -> bool {
        return self.command == "/reject";
    }

    pub fn is_notifications(&self) -> bool {
        return ["/n", "/notifications"].contains(&self.command.as_str());
    }

    pub fn is_tasks(&self) -> bool {
        return ["/t", "/tasks"].contains(&self.command.as_str());
    }
}
