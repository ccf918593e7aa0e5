//! Client commands - talk to a running lexlist server over HTTP.

use lexlist::{
    ListView, format_timestamp,
    list::{Entry, IndexedEntry, List},
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::api::{
    CreateEntryRequest, ErrorBody, ListNameRequest, LoginForm, RegisterRequest, ReorderRequest,
    TokenResponse, UpdateEntryRequest, UserInfo,
};
use crate::cli::{ClientArgs, CredentialsArgs, EntriesCommand, ListsCommand};
use crate::output::{OutputFormat, print_json, print_table};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Thin wrapper over `reqwest` for the lexlist API.
struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    fn new(args: &ClientArgs) -> CliResult<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base: args.url.trim_end_matches('/').to_string(),
            token: args.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> CliResult<RequestBuilder> {
        let request = self.http.request(method, format!("{}{path}", self.base));
        match &self.token {
            Some(token) => Ok(request.bearer_auth(token)),
            None if path.starts_with("/api/users") || path == "/api/token" => Ok(request),
            None => Err("this command needs --token or LEXLIST_TOKEN (run `lexlist login`)".into()),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> CliResult<T> {
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> CliResult<T> {
        self.send(self.request(Method::GET, path)?).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> CliResult<T> {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> CliResult<T> {
        self.send(self.request(Method::PUT, path)?.json(body)).await
    }

    async fn delete(&self, path: &str) -> CliResult<()> {
        check(self.request(Method::DELETE, path)?.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-success response into an error carrying the server's detail.
async fn check(response: reqwest::Response) -> CliResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    if status == StatusCode::UNAUTHORIZED {
        return Err(format!("{status}: {detail} (try `lexlist login`)").into());
    }
    Err(format!("{status}: {detail}").into())
}

pub async fn register(args: &CredentialsArgs, format: OutputFormat) -> CliResult<()> {
    let client = ApiClient::new(&args.client)?;
    let user: UserInfo = client
        .post(
            "/api/users",
            &RegisterRequest {
                username: args.username.clone(),
                password: args.password.clone(),
            },
        )
        .await?;

    match format {
        OutputFormat::Json => print_json(&user)?,
        OutputFormat::Human => println!("Registered {} ({})", user.username, user.id),
    }
    Ok(())
}

pub async fn login(args: &CredentialsArgs, format: OutputFormat) -> CliResult<()> {
    let client = ApiClient::new(&args.client)?;
    let request = client.request(Method::POST, "/api/token")?.form(&LoginForm {
        username: args.username.clone(),
        password: args.password.clone(),
    });
    let token: TokenResponse = client.send(request).await?;

    match format {
        OutputFormat::Json => print_json(&token)?,
        OutputFormat::Human => {
            println!("{}", token.access_token);
            eprintln!(
                "Token valid for {} minutes. Export it as LEXLIST_TOKEN.",
                token.expires_in / 60
            );
        }
    }
    Ok(())
}

pub async fn lists(command: &ListsCommand, format: OutputFormat) -> CliResult<()> {
    match command {
        ListsCommand::List { client } => {
            let lists: Vec<List> = ApiClient::new(client)?.get("/api/lists").await?;
            match format {
                OutputFormat::Json => print_json(&lists)?,
                OutputFormat::Human if lists.is_empty() => println!("No lists found."),
                OutputFormat::Human => print_lists(&lists),
            }
        }
        ListsCommand::Create { name, client } => {
            let list: List = ApiClient::new(client)?
                .post("/api/lists", &ListNameRequest { name: name.clone() })
                .await?;
            print_list_result(&list, format)?;
        }
        ListsCommand::Get { id, client } => {
            let view: ListView = ApiClient::new(client)?
                .get(&format!("/api/lists/{id}"))
                .await?;
            match format {
                OutputFormat::Json => print_json(&view)?,
                OutputFormat::Human => {
                    println!("{} ({})", view.list.name, view.list.id);
                    if view.entries.is_empty() {
                        println!("No entries.");
                    } else {
                        print_indexed(&view.entries);
                    }
                }
            }
        }
        ListsCommand::Update { id, name, client } => {
            let list: List = ApiClient::new(client)?
                .put(
                    &format!("/api/lists/{id}"),
                    &ListNameRequest { name: name.clone() },
                )
                .await?;
            print_list_result(&list, format)?;
        }
        ListsCommand::Delete { id, client } => {
            ApiClient::new(client)?
                .delete(&format!("/api/lists/{id}"))
                .await?;
            if format == OutputFormat::Human {
                println!("Deleted list {id}");
            }
        }
        ListsCommand::Reorder {
            id,
            entry,
            index,
            client,
        } => {
            let entries: Vec<IndexedEntry> = ApiClient::new(client)?
                .put(
                    &format!("/api/lists/{id}/reorder"),
                    &ReorderRequest {
                        entry_id: *entry,
                        index: *index,
                    },
                )
                .await?;
            print_indexed_result(&entries, format)?;
        }
        ListsCommand::Rebalance { id, client } => {
            let entries: Vec<IndexedEntry> = ApiClient::new(client)?
                .post(&format!("/api/lists/{id}/rebalance"), &serde_json::json!({}))
                .await?;
            print_indexed_result(&entries, format)?;
        }
    }
    Ok(())
}

pub async fn entries(command: &EntriesCommand, format: OutputFormat) -> CliResult<()> {
    match command {
        EntriesCommand::List { client } => {
            let entries: Vec<Entry> = ApiClient::new(client)?.get("/api/entries").await?;
            match format {
                OutputFormat::Json => print_json(&entries)?,
                OutputFormat::Human if entries.is_empty() => println!("No entries found."),
                OutputFormat::Human => print_entries(&entries),
            }
        }
        EntriesCommand::Create {
            list,
            message,
            index,
            client,
        } => {
            let entry: Entry = ApiClient::new(client)?
                .post(
                    "/api/entries",
                    &CreateEntryRequest {
                        list_id: *list,
                        message: message.clone(),
                        index: *index,
                    },
                )
                .await?;
            print_entry_result(&entry, format)?;
        }
        EntriesCommand::Get { id, client } => {
            let entry: Entry = ApiClient::new(client)?
                .get(&format!("/api/entries/{id}"))
                .await?;
            print_entry_result(&entry, format)?;
        }
        EntriesCommand::Update {
            id,
            message,
            client,
        } => {
            let entry: Entry = ApiClient::new(client)?
                .put(
                    &format!("/api/entries/{id}"),
                    &UpdateEntryRequest {
                        message: message.clone(),
                    },
                )
                .await?;
            print_entry_result(&entry, format)?;
        }
        EntriesCommand::Delete { id, client } => {
            ApiClient::new(client)?
                .delete(&format!("/api/entries/{id}"))
                .await?;
            if format == OutputFormat::Human {
                println!("Deleted entry {id}");
            }
        }
        EntriesCommand::Toggle { id, client } => {
            let entry: Entry = ApiClient::new(client)?
                .put(&format!("/api/entries/{id}/toggle"), &serde_json::json!({}))
                .await?;
            print_entry_result(&entry, format)?;
        }
    }
    Ok(())
}

fn print_lists(lists: &[List]) {
    let rows: Vec<Vec<String>> = lists
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.name.clone(),
                format_timestamp(l.created_at),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "CREATED"], &rows);
}

fn print_list_result(list: &List, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(list)?,
        OutputFormat::Human => print_lists(std::slice::from_ref(list)),
    }
    Ok(())
}

fn status_mark(active: bool) -> &'static str {
    if active { "[ ]" } else { "[x]" }
}

fn print_indexed(entries: &[IndexedEntry]) {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.index.to_string(),
                status_mark(e.entry.active).to_string(),
                e.entry.message.clone(),
                e.entry.rank.to_string(),
                e.entry.id.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "DONE", "MESSAGE", "RANK", "ID"], &rows);
}

fn print_indexed_result(entries: &[IndexedEntry], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Human => print_indexed(entries),
    }
    Ok(())
}

fn print_entries(entries: &[Entry]) {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.list_id.to_string(),
                status_mark(e.active).to_string(),
                e.message.clone(),
                e.rank.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "LIST", "DONE", "MESSAGE", "RANK"], &rows);
}

fn print_entry_result(entry: &Entry, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(entry)?,
        OutputFormat::Human => print_entries(std::slice::from_ref(entry)),
    }
    Ok(())
}
