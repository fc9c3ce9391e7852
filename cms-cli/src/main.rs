use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cms_client::{CmsClient, CmsClientError, Comment, Post, PostInput, PostPage, PostQuery};

const TOKEN_FILE: &str = ".cms_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "cms-cli", version, about = "CLI клиент для cms-server")]
struct Cli {
    /// Адрес HTTP-сервера.
    #[arg(long, global = true, env = "CMS_SERVER")]
    server: Option<String>,

    /// Bearer-токен; иначе берётся из CMS_TOKEN или файла .cms_token.
    #[arg(long, global = true, env = "CMS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Печатать ответы сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Операции с постами.
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Операции с комментариями.
    #[command(subcommand)]
    Comments(CommentsCommand),
}

#[derive(Debug, Subcommand)]
enum PostsCommand {
    /// Список постов с фильтрами и пагинацией.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        sort_order: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Пост по слагу вместе с комментариями.
    Get {
        #[arg(long)]
        slug: String,
    },
    /// Создание поста (требует токен).
    Create(PostArgs),
    /// Замена содержимого поста (требует токен); без --status статус не меняется.
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        post: PostArgs,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Args)]
struct PostArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: String,
    #[arg(long)]
    featured_image: Option<String>,
    /// draft, published или archived.
    #[arg(long)]
    status: Option<String>,
}

impl From<PostArgs> for PostInput {
    fn from(args: PostArgs) -> Self {
        Self {
            title: args.title,
            content: args.content,
            featured_image: args.featured_image,
            status: args.status,
        }
    }
}

#[derive(Debug, Subcommand)]
enum CommentsCommand {
    /// Комментарии поста.
    List {
        #[arg(long)]
        post_id: i64,
    },
    /// Новый комментарий (требует токен).
    Create {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        content: String,
    },
    /// Изменение комментария (требует токен).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        content: String,
    },
    /// Удаление комментария (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let server = normalize_server(cli.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()));
    let mut client = CmsClient::new(server).map_err(map_client_error)?;

    let token = match cli.token.as_deref().and_then(parse_token_content) {
        Some(token) => Some(token),
        None => load_token().context("не удалось прочитать .cms_token")?,
    };
    if let Some(token) = token {
        client.set_token(token);
    }

    match cli.command {
        Command::Posts(command) => run_posts(&client, command, cli.json).await,
        Command::Comments(command) => run_comments(&client, command, cli.json).await,
    }
}

async fn run_posts(client: &CmsClient, command: PostsCommand, json: bool) -> Result<()> {
    match command {
        PostsCommand::List {
            search,
            status,
            sort_by,
            sort_order,
            page,
            per_page,
        } => {
            let query = PostQuery {
                search,
                status,
                sort_by,
                sort_order,
                page,
                per_page,
            };
            let page = client.list_posts(&query).await.map_err(map_client_error)?;
            if json {
                return print_json(&page);
            }
            print_page(&page);
        }
        PostsCommand::Get { slug } => {
            let detail = client.get_post(&slug).await.map_err(map_client_error)?;
            if json {
                return print_json(&detail);
            }
            print_post("Пост", &detail.post);
            println!("comments: {}", detail.comments.len());
            for comment in &detail.comments {
                print_comment_line(comment);
            }
        }
        PostsCommand::Create(args) => {
            let post = client
                .create_post(&args.into())
                .await
                .map_err(map_client_error)?;
            if json {
                return print_json(&post);
            }
            print_post("Пост создан", &post);
        }
        PostsCommand::Update { id, post } => {
            let post = client
                .update_post(id, &post.into())
                .await
                .map_err(map_client_error)?;
            if json {
                return print_json(&post);
            }
            print_post("Пост обновлён", &post);
        }
        PostsCommand::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
    }
    Ok(())
}

async fn run_comments(client: &CmsClient, command: CommentsCommand, json: bool) -> Result<()> {
    match command {
        CommentsCommand::List { post_id } => {
            let comments = client
                .list_comments(post_id)
                .await
                .map_err(map_client_error)?;
            if json {
                return print_json(&comments);
            }
            println!("Комментариев: {}", comments.len());
            for comment in &comments {
                print_comment_line(comment);
            }
        }
        CommentsCommand::Create { post_id, content } => {
            let comment = client
                .create_comment(post_id, &content)
                .await
                .map_err(map_client_error)?;
            if json {
                return print_json(&comment);
            }
            println!("Комментарий создан: id={}", comment.id);
        }
        CommentsCommand::Update { id, content } => {
            let comment = client
                .update_comment(id, &content)
                .await
                .map_err(map_client_error)?;
            if json {
                return print_json(&comment);
            }
            println!("Комментарий обновлён: id={}", comment.id);
        }
        CommentsCommand::Delete { id } => {
            client.delete_comment(id).await.map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
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

fn map_client_error(err: CmsClientError) -> anyhow::Error {
    let message = match err {
        CmsClientError::Unauthenticated => {
            "требуется токен: передайте --token, задайте CMS_TOKEN или положите его в .cms_token"
                .to_string()
        }
        CmsClientError::Forbidden => "недостаточно прав для операции".to_string(),
        CmsClientError::NotFound(message) => format!("ресурс не найден: {message}"),
        CmsClientError::Conflict(message) => format!("конфликт: {message}"),
        CmsClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        CmsClientError::Server(message) => format!("ошибка сервера: {message}"),
        CmsClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("slug: {}", post.slug);
    println!("title: {}", post.title);
    println!("status: {}", post.status);
    match &post.user {
        Some(author) => println!("author: {} (id={})", author.email, author.id),
        None => println!("user_id: {}", post.user_id),
    }
    if let Some(image) = &post.featured_image {
        println!("featured_image: {image}");
    }
    if let Some(published_at) = post.published_at {
        println!("published_at: {published_at}");
    }
    println!("content: {}", post.content);
}

fn print_comment_line(comment: &Comment) {
    match &comment.user {
        Some(author) => println!("- [{}] {}: {}", comment.id, author.email, comment.content),
        None => println!(
            "- [{}] user_id={}: {}",
            comment.id, comment.user_id, comment.content
        ),
    }
}

fn print_page(page: &PostPage) {
    println!(
        "Постов: {} (страница {}/{}, по {}, всего {})",
        page.posts.len(),
        page.page,
        page.last_page,
        page.per_page,
        page.total
    );

    for post in &page.posts {
        println!("- [{}] {} ({}, {})", post.id, post.title, post.slug, post.status);
    }
}
