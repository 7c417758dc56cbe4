use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use yatube_client::{AuthResponse, Group, Post, PostDetail, PostPage, YatubeClient, YatubeClientError};

const TOKEN_FILE: &str = ".yatube_token";
const DEFAULT_HTTP_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "yatube-cli", version, about = "CLI клиент для yatube-server")]
struct Cli {
    /// Адрес сервера.
    #[arg(long, global = true, env = "YATUBE_HTTP_URL")]
    server: Option<String>,

    /// Печатать ответы сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённый токен.
    Logout,
    /// Работа с постами.
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Работа с сообществами.
    #[command(subcommand)]
    Groups(GroupsCommand),
    /// Посты пользователя.
    Profile {
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Debug, Subcommand)]
enum PostsCommand {
    /// Лента постов, новые первыми.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        text: String,
        /// id сообщества.
        #[arg(long)]
        group: Option<i64>,
    },
    /// Редактирование своего поста (требует токен).
    ///
    /// Если `--text` не указан, используется текущий текст поста.
    /// Без `--group` пост остаётся без сообщества.
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        group: Option<i64>,
    },
}

#[derive(Debug, Subcommand)]
enum GroupsCommand {
    /// Список сообществ.
    List,
    /// Создание сообщества (только персонал).
    Create {
        #[arg(long)]
        title: String,
        /// По умолчанию получается из названия.
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: String,
    },
    /// Удаление сообщества (только персонал).
    Delete { slug: String },
    /// Посты сообщества.
    Posts {
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let server = normalize_server(
        cli.server
            .unwrap_or_else(|| DEFAULT_HTTP_SERVER.to_string()),
    );
    let mut client = YatubeClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .yatube_token")? {
        client.set_token(token);
    }

    let printer = Printer { json: cli.json };

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            printer.auth("Регистрация успешна", &auth)?;
        }
        Command::Login { username, password } => {
            let auth = client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            printer.auth("Вход выполнен", &auth)?;
        }
        Command::Logout => {
            remove_token().context("не удалось удалить токен")?;
            println!("Токен удалён");
        }
        Command::Posts(command) => run_posts(&client, &printer, command).await?,
        Command::Groups(command) => run_groups(&client, &printer, command).await?,
        Command::Profile { username, page } => {
            let page = client
                .profile_posts(&username, page)
                .await
                .map_err(map_client_error)?;
            printer.page(&format!("Посты пользователя {username}"), &page)?;
        }
    }

    Ok(())
}

async fn run_posts(client: &YatubeClient, printer: &Printer, command: PostsCommand) -> Result<()> {
    match command {
        PostsCommand::List { page } => {
            let page = client.list_posts(page).await.map_err(map_client_error)?;
            printer.page("Последние обновления", &page)?;
        }
        PostsCommand::Get { id } => {
            let detail = client.get_post(id).await.map_err(map_client_error)?;
            printer.detail(&detail)?;
        }
        PostsCommand::Create { text, group } => {
            let post = client
                .create_post(&text, group)
                .await
                .map_err(map_client_error)?;
            printer.post("Пост создан", &post)?;
        }
        PostsCommand::Edit { id, text, group } => {
            // без --text сохраняем текущий текст поста
            let text = match text {
                Some(text) => text,
                None => client.get_post(id).await.map_err(map_client_error)?.post.text,
            };

            let post = client
                .update_post(id, &text, group)
                .await
                .map_err(map_client_error)?;
            printer.post("Пост обновлён", &post)?;
        }
    }
    Ok(())
}

async fn run_groups(client: &YatubeClient, printer: &Printer, command: GroupsCommand) -> Result<()> {
    match command {
        GroupsCommand::List => {
            let groups = client.list_groups().await.map_err(map_client_error)?;
            printer.groups(&groups)?;
        }
        GroupsCommand::Create {
            title,
            slug,
            description,
        } => {
            let group = client
                .create_group(&title, slug.as_deref(), &description)
                .await
                .map_err(map_client_error)?;
            printer.groups(std::slice::from_ref(&group))?;
        }
        GroupsCommand::Delete { slug } => {
            client.delete_group(&slug).await.map_err(map_client_error)?;
            println!("Сообщество удалено: {slug}");
        }
        GroupsCommand::Posts { slug, page } => {
            let page = client
                .group_posts(&slug, page)
                .await
                .map_err(map_client_error)?;
            printer.page(&format!("Посты сообщества {slug}"), &page)?;
        }
    }
    Ok(())
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &YatubeClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    match fs::remove_file(TOKEN_FILE) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn map_client_error(err: YatubeClientError) -> anyhow::Error {
    let message = match err {
        YatubeClientError::Unauthorized => {
            "требуется авторизация: выполните `yatube-cli login ...` или `yatube-cli register ...`"
                .to_string()
        }
        YatubeClientError::Forbidden => "недостаточно прав для этого действия".to_string(),
        YatubeClientError::NotFound => "ресурс не найден".to_string(),
        YatubeClientError::Conflict(message) => format!("конфликт: {message}"),
        YatubeClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        YatubeClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

/// Печать результатов: текстом или, с `--json`, как JSON.
struct Printer {
    json: bool,
}

impl Printer {
    fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
        let raw = serde_json::to_string_pretty(value).context("не удалось сериализовать ответ")?;
        println!("{raw}");
        Ok(())
    }

    fn auth(&self, title: &str, auth: &AuthResponse) -> Result<()> {
        if self.json {
            return Self::print_json(auth);
        }
        println!("{title}");
        println!("token: {}", auth.access_token);
        println!("expires_in: {}", auth.expires_in);
        println!("user:");
        println!("  id: {}", auth.user.id);
        println!("  username: {}", auth.user.username);
        println!("  email: {}", auth.user.email);
        Ok(())
    }

    fn post(&self, title: &str, post: &Post) -> Result<()> {
        if self.json {
            return Self::print_json(post);
        }
        println!("{title}");
        print_post_fields(post);
        Ok(())
    }

    fn detail(&self, detail: &PostDetail) -> Result<()> {
        if self.json {
            return Self::print_json(detail);
        }
        println!("Пост");
        print_post_fields(&detail.post);
        println!("постов автора: {}", detail.author_post_count);
        Ok(())
    }

    fn page(&self, title: &str, page: &PostPage) -> Result<()> {
        if self.json {
            return Self::print_json(page);
        }
        println!(
            "{title}: страница {} из {} (всего постов: {})",
            page.page, page.num_pages, page.total
        );
        for post in &page.posts {
            println!("- {}", post_summary(post));
        }
        Ok(())
    }

    fn groups(&self, groups: &[Group]) -> Result<()> {
        if self.json {
            return Self::print_json(&groups);
        }
        for group in groups {
            println!("- [{}] {} ({}): {}", group.id, group.title, group.slug, group.description);
        }
        Ok(())
    }
}

fn print_post_fields(post: &Post) {
    println!("id: {}", post.id);
    println!("text: {}", post.text);
    println!("author: {} (id={})", post.author, post.author_id);
    if let Some(group) = &post.group {
        println!("group: {} ({})", group.title, group.slug);
    }
    println!("pub_date: {}", post.pub_date);
}

fn post_summary(post: &Post) -> String {
    let text: String = post.text.chars().take(30).collect();
    match &post.group {
        Some(group) => format!("[{}] {} @{} #{}", post.id, text, post.author, group.slug),
        None => format!("[{}] {} @{}", post.id, text, post.author),
    }
}
