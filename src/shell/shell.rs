use tracing::debug;

use crate::filesystem::{Namespace, NamespaceError, path};
use crate::shell::command::{Command, LsOptions, USAGE};
use crate::shell::listing::{ListEntry, long_format, short_format};

pub const GUEST_USER: &str = "guest";
const HOST_NAME: &str = "treefs";

/// Command-line emulator over a [`Namespace`].
///
/// Keeps a logical working directory: `cd` through a link keeps the link's
/// path, `..` then walks back along what was typed.
pub struct Shell<'a> {
    namespace: &'a Namespace,
    cwd: String,
    user: String,
    color: bool,
}

impl<'a> Shell<'a> {
    pub fn new(namespace: &'a Namespace) -> Self {
        Shell {
            namespace,
            cwd: path::GUEST_HOME.to_string(),
            user: GUEST_USER.to_string(),
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Starts somewhere other than the guest home. Ignored unless `cwd`
    /// names a readable folder.
    pub fn with_cwd(mut self, cwd: &str) -> Self {
        let cwd = path::normalize(cwd);
        let enterable = self.namespace.resolve_path(&cwd).is_ok_and(|resolved| {
            resolved.is_terminal()
                && self.namespace.node(resolved.node).is_folder()
                && self.namespace.can_read(&cwd, &resolved)
        });
        if enterable {
            self.cwd = cwd;
        }
        self
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn prompt(&self) -> String {
        let location = if self.cwd == path::GUEST_HOME {
            "~".to_string()
        } else {
            match self.cwd.strip_prefix(path::GUEST_HOME) {
                Some(rest) if rest.starts_with('/') => format!("~{rest}"),
                _ => self.cwd.clone(),
            }
        };
        format!("{}@{}:{}$ ", self.user, HOST_NAME, location)
    }

    /// Runs one command line and returns what it prints.
    pub fn execute(&mut self, line: &str) -> String {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                let name = line.split_whitespace().next().unwrap_or("sh");
                return format!("{name}: {e}");
            }
        };
        debug!("Executing {:?} in {}", command, self.cwd);

        match command {
            Command::Empty => String::new(),
            Command::Echo(args) => args.join(" "),
            Command::Pwd => self.cwd.clone(),
            Command::Whoami => self.user.clone(),
            Command::Help => Self::help(),
            Command::Cd(target) => self.cd(target.as_deref()),
            Command::Ls(options) => self.ls(&options),
            Command::Cat(files) => self.cat(&files),
            Command::Touch(files) => Self::refuse("touch", "cannot touch", &files, "file"),
            Command::Mkdir(dirs) => {
                Self::refuse("mkdir", "cannot create directory", &dirs, "directory")
            }
            Command::Sudo => format!(
                "{} is not in the sudoers file. This incident will be reported.",
                self.user
            ),
            Command::Passwd => format!("passwd: password changes are disabled for {}", self.user),
            Command::Unknown(name) => format!("{name}: command not found"),
        }
    }

    fn help() -> String {
        USAGE
            .iter()
            .map(|(name, usage)| format!("{name:<8}{usage}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn cd(&mut self, target: Option<&str>) -> String {
        let target = target.unwrap_or("~");
        let destination = path::resolve(&self.cwd, target);

        let resolved = match self.namespace.resolve_path(&destination) {
            Ok(resolved) => resolved,
            Err(_) => return format!("cd: {target}: No such file or directory"),
        };
        if !resolved.is_terminal() {
            return format!("cd: {target}: No such file or directory");
        }
        if !self.namespace.node(resolved.node).is_folder() {
            return format!("cd: {target}: Not a directory");
        }
        if !self.namespace.can_read(&destination, &resolved) {
            return format!("cd: {target}: Permission denied");
        }

        debug!("Changing directory to {}", destination);
        self.cwd = destination;
        String::new()
    }

    fn ls(&self, options: &LsOptions) -> String {
        let shown = options.target.as_deref().unwrap_or(".");
        let target = path::resolve(&self.cwd, shown);
        let namespace = self.namespace;

        let Some(id) = namespace.locate(&target) else {
            return format!("ls: cannot access '{shown}': No such file or directory");
        };
        let resolved = match namespace.resolve_path(&target) {
            Ok(resolved) => resolved,
            Err(_) => return format!("ls: cannot access '{shown}': No such file or directory"),
        };

        if !resolved.is_terminal() || !namespace.node(resolved.node).is_folder() {
            let name = path::file_name(&target).unwrap_or_else(|| "/".to_string());
            let entry = ListEntry::new(namespace, name, id).with_resolved(resolved);
            return self.format(&[entry], options.long);
        }

        if !namespace.can_read(&target, &resolved) {
            return format!("ls: cannot open directory '{shown}': Permission denied");
        }

        let children = match namespace.children_of(&target) {
            Ok(children) => children,
            Err(NamespaceError::PermissionDenied { .. }) => {
                return format!("ls: cannot open directory '{shown}': Permission denied");
            }
            Err(_) => return format!("ls: cannot access '{shown}': No such file or directory"),
        };

        let mut entries = Vec::with_capacity(children.len() + 2);
        if options.all {
            entries.push(ListEntry::new(namespace, ".", resolved.node));
            let parent = namespace
                .resolve_path(&path::parent_of(&target))
                .map(|parent| parent.node)
                .unwrap_or(resolved.node);
            entries.push(ListEntry::new(namespace, "..", parent));
        }
        entries.extend(
            children
                .into_iter()
                .map(|child| ListEntry::new(namespace, child.name, child.id).with_resolved(child.resolved))
                .filter(|entry| options.all || !entry.is_hidden()),
        );

        self.format(&entries, options.long)
    }

    fn format(&self, entries: &[ListEntry], long: bool) -> String {
        if long {
            long_format(entries, self.color)
        } else {
            short_format(entries, self.color)
        }
    }

    fn cat(&self, files: &[String]) -> String {
        if files.is_empty() {
            return "cat: missing file operand".to_string();
        }

        files
            .iter()
            .map(|file| {
                let target = path::resolve(&self.cwd, file);
                match self.namespace.resolve_path(&target) {
                    Ok(resolved) if !resolved.is_terminal() => {
                        format!("cat: {file}: No such file or directory")
                    }
                    Ok(resolved) if self.namespace.node(resolved.node).is_folder() => {
                        format!("cat: {file}: Is a directory")
                    }
                    Ok(resolved) if !self.namespace.can_read(&target, &resolved) => {
                        format!("cat: {file}: Permission denied")
                    }
                    Ok(_) => format!("cat: {file}: file contents are not stored in this namespace"),
                    Err(_) => format!("cat: {file}: No such file or directory"),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The namespace is read-only, so anything that would create entries
    /// is refused.
    fn refuse(command: &str, action: &str, operands: &[String], kind: &str) -> String {
        if operands.is_empty() {
            return format!("{command}: missing {kind} operand");
        }
        operands
            .iter()
            .map(|operand| format!("{command}: {action} '{operand}': Permission denied"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamespaceSeed;
    use rstest::{fixture, rstest};

    #[fixture]
    fn namespace() -> Namespace {
        Namespace::builtin().unwrap()
    }

    #[rstest]
    fn starts_at_guest_home(namespace: Namespace) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(shell.execute("pwd"), "/home/guest");
        assert_eq!(shell.execute("whoami"), "guest");
        assert_eq!(shell.prompt(), "guest@treefs:~$ ");
    }

    #[rstest]
    #[case("Desktop", "/home/guest/Desktop")]
    #[case("..", "/home")]
    #[case("../..", "/")]
    #[case("../../..", "/")]
    #[case("/usr/bin/../bin", "/usr/bin")]
    #[case("~/Documents", "/home/guest/Documents")]
    #[case("Desktop/Projects", "/home/guest/Desktop/Projects")]
    fn cd_moves(namespace: Namespace, #[case] target: &str, #[case] expected: &str) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(shell.execute(&format!("cd {target}")), "");
        assert_eq!(shell.execute("pwd"), expected);
    }

    #[rstest]
    fn cd_without_argument_goes_home(namespace: Namespace) {
        let mut shell = Shell::new(&namespace).with_cwd("/home");
        assert_eq!(shell.cwd(), "/home");
        shell.execute("cd");
        assert_eq!(shell.cwd(), "/home/guest");
    }

    #[rstest]
    #[case("Music", "cd: Music: No such file or directory")]
    #[case("Desktop/welcome.md", "cd: Desktop/welcome.md: Not a directory")]
    #[case("/home/jay", "cd: /home/jay: Permission denied")]
    #[case("~jay", "cd: ~jay: Permission denied")]
    #[case("/etc", "cd: /etc: Permission denied")]
    fn cd_failures_keep_cwd(namespace: Namespace, #[case] target: &str, #[case] message: &str) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(shell.execute(&format!("cd {target}")), message);
        assert_eq!(shell.cwd(), "/home/guest");
    }

    #[rstest]
    fn ls_hides_dotfiles_unless_all(namespace: Namespace) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(
            shell.execute("ls"),
            "Desktop  Documents  Projects  Blog  Wallpapers"
        );
        assert_eq!(
            shell.execute("ls -a"),
            ".  ..  .profile  Desktop  Documents  Projects  Blog  Wallpapers"
        );
    }

    #[rstest]
    fn ls_long_shows_links(namespace: Namespace) {
        let mut shell = Shell::new(&namespace);
        let listing = shell.execute("ls -l Desktop");
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "-r--r--r-- 1 guest guest 1024 Jan 09 19:30 welcome.md"
        );
        assert!(lines[1].starts_with("lr--r--r-- 1 guest guest"));
        assert!(lines[1].ends_with("Projects -> ../Projects"));
        assert!(lines[2].ends_with("Blog -> /home/guest/Blog"));
    }

    #[rstest]
    fn ls_long_all_includes_dot_entries(namespace: Namespace) {
        let mut shell = Shell::new(&namespace);
        let listing = shell.execute("ls -la");
        let mut lines = listing.lines();
        assert!(lines.next().unwrap().ends_with(" ."));
        let parent = lines.next().unwrap();
        assert!(parent.starts_with("drwxr-xr-x 2 root"));
        assert!(parent.ends_with(" .."));
    }

    #[rstest]
    fn ls_of_a_file_prints_it(namespace: Namespace) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(shell.execute("ls Documents/test.md"), "test.md");
        assert_eq!(
            shell.execute("ls -l 'Documents/jay'\\''s resume.pdf'"),
            "-r--r--r-- 1 guest guest 48213 Jan 09 19:30 jay's resume.pdf"
        );
    }

    #[rstest]
    fn ls_through_link(namespace: Namespace) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(shell.execute("ls Desktop/Projects"), "project1.zip");
        shell.execute("cd Desktop/Projects");
        assert_eq!(shell.execute("ls"), "project1.zip");
        assert_eq!(shell.execute("pwd"), "/home/guest/Desktop/Projects");
    }

    #[rstest]
    #[case("ls Music", "ls: cannot access 'Music': No such file or directory")]
    #[case("ls /home/jay", "ls: cannot open directory '/home/jay': Permission denied")]
    #[case("ls -z", "ls: invalid option -- 'z'")]
    fn ls_failures(namespace: Namespace, #[case] line: &str, #[case] message: &str) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(shell.execute(line), message);
    }

    #[rstest]
    #[case("cat Desktop", "cat: Desktop: Is a directory")]
    #[case("cat nope.md", "cat: nope.md: No such file or directory")]
    #[case("cat", "cat: missing file operand")]
    #[case(
        "cat Desktop/welcome.md",
        "cat: Desktop/welcome.md: file contents are not stored in this namespace"
    )]
    #[case("touch a b", "touch: cannot touch 'a': Permission denied\ntouch: cannot touch 'b': Permission denied")]
    #[case("mkdir x", "mkdir: cannot create directory 'x': Permission denied")]
    #[case("mkdir", "mkdir: missing directory operand")]
    #[case("echo hello   world", "hello world")]
    #[case("frobnicate", "frobnicate: command not found")]
    #[case("echo 'open", "echo: unexpected end of input while looking for matching quote")]
    #[case("", "")]
    fn simple_commands(namespace: Namespace, #[case] line: &str, #[case] expected: &str) {
        let mut shell = Shell::new(&namespace);
        assert_eq!(shell.execute(line), expected);
    }

    #[rstest]
    fn help_lists_every_command(namespace: Namespace) {
        let mut shell = Shell::new(&namespace);
        let help = shell.execute("help");
        assert_eq!(help.lines().count(), USAGE.len());
        assert!(help.contains("ls [-a] [-l] [path]"));
    }

    #[rstest]
    #[case("/home/guest/Desktop", "guest@treefs:~/Desktop$ ")]
    #[case("/usr/bin", "guest@treefs:/usr/bin$ ")]
    fn prompt_abbreviates_home(namespace: Namespace, #[case] cwd: &str, #[case] expected: &str) {
        let shell = Shell::new(&namespace).with_cwd(cwd);
        assert_eq!(shell.prompt(), expected);
    }

    #[rstest]
    #[case("/home/guest/Desktop/welcome.md")]
    #[case("/home/jay")]
    fn with_cwd_ignores_unenterable_paths(namespace: Namespace, #[case] cwd: &str) {
        let shell = Shell::new(&namespace).with_cwd(cwd);
        assert_eq!(shell.cwd(), "/home/guest");
    }

    const READABLE_LINKS_SEED: &str = r#"
root:
  permissions: "drwxr-xr-x"
  children:
    home:
      children:
        guest:
          children:
            Desktop:
              children:
                peek:
                  link: ../../jay
                diary.md:
                  link: ../../jay/secret.md
            peek:
              link: ../jay
            diary.md:
              link: ../jay/secret.md
        jay:
          permissions: "drwx------"
          children:
            secret.md:
              permissions: "-rw-------"
"#;

    #[fixture]
    fn linked_namespace() -> Namespace {
        NamespaceSeed::try_from(READABLE_LINKS_SEED)
            .unwrap()
            .into_namespace()
    }

    #[rstest]
    #[case("cd peek", "cd: peek: Permission denied")]
    #[case("ls peek", "ls: cannot open directory 'peek': Permission denied")]
    #[case("cat diary.md", "cat: diary.md: Permission denied")]
    fn readable_link_does_not_open_private_target(
        linked_namespace: Namespace,
        #[case] line: &str,
        #[case] message: &str,
    ) {
        let mut shell = Shell::new(&linked_namespace);
        assert_eq!(shell.execute(line), message);
        assert_eq!(shell.cwd(), "/home/guest");
    }
}
