use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command::{self, Args, CommandTable, Context, TableOfComments};
use crate::config::{Config, TomlSettings};
use crate::host::{Dismiss, Editor, TextBuffer};
use crate::outline;
use crate::scan;
use crate::types::{detect_lang, Direction, Title};

/// Line-delimited JSON-RPC 2.0 over stdio, so an editor can host the command.
/// Documents travel as text; every response carries the resulting text and
/// cursor so the host can apply them as one edit.
/// - `toc/titles`  → scan only
/// - `toc/sync`    → rewrite the outline block
/// - `toc/outline` → sync, then list labels for the host's picker
/// - `toc/select`  → jump to a picked entry (`index = -1` cancels)
/// - `toc/move`    → jump up / down from the cursor
pub fn run(settings: TomlSettings) -> io::Result<()> {
    let server = Server {
        settings,
        commands: CommandTable::with_builtins(),
    };
    server.serve(io::stdin().lock(), io::stdout().lock())
}

#[derive(Deserialize)]
struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
struct Position {
    line: usize,
    #[serde(default)]
    col: usize,
}

/// Parameters shared by every document method.
#[derive(Deserialize)]
struct DocumentParams {
    text: String,
    /// Used only to pick a grammar for scope classification.
    #[serde(default)]
    path: Option<PathBuf>,
    /// Per-request settings layered over the server's.
    #[serde(default)]
    settings: Map<String, Value>,
    /// Current carets, 0-based. Empty means one caret at the start.
    #[serde(default)]
    cursors: Vec<Position>,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    index: Option<i64>,
}

const METHODS: [&str; 5] = ["toc/titles", "toc/sync", "toc/outline", "toc/select", "toc/move"];

struct Server {
    settings: TomlSettings,
    commands: CommandTable,
}

impl Server {
    /// One request per line in, one response per line out. Requests without an
    /// id are notifications and get no response.
    fn serve(&self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(req) if req.id.is_none() => {
                    tracing::debug!(method = %req.method, "dropping notification");
                    continue;
                }
                Ok(req) => self.handle_request(&req),
                Err(e) => JsonRpcResponse::failure(None, PARSE_ERROR, format!("parse error: {e}")),
            };
            serde_json::to_writer(&mut output, &response)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
        Ok(())
    }

    fn handle_request(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let id = req.id.clone();
        match req.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "serverInfo": {
                        "name": "tableofcomments",
                        "version": env!("CARGO_PKG_VERSION")
                    },
                    "commands": self.commands.names(),
                    "methods": METHODS,
                }),
            ),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            method if METHODS.contains(&method) => match self.dispatch(method, &req.params) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(message) => JsonRpcResponse::failure(id, INVALID_PARAMS, message),
            },
            method => {
                JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("method not found: {method}"))
            }
        }
    }

    /// Execute a document method. Returns the result object or an invalid-params message.
    fn dispatch(&self, method: &str, params: &Value) -> Result<Value, String> {
        let params: DocumentParams =
            serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {e}"))?;
        let settings = self.settings_for(&params.settings);
        let cfg = Config::resolve(&settings);

        let lang = params.path.as_deref().and_then(detect_lang);
        let mut buf = TextBuffer::new(params.text, lang, cfg.syntax_scopes);
        if !params.cursors.is_empty() {
            let positions: Vec<(usize, usize)> =
                params.cursors.iter().map(|p| (p.line, p.col)).collect();
            buf.set_cursors(&positions);
        }

        match method {
            "toc/titles" => {
                let titles = scan::scan(buf.text(), &buf, &cfg).map_err(|e| e.to_string())?;
                Ok(serde_json::json!({ "titles": titles }))
            }
            "toc/sync" => {
                let state = outline::sync(&mut buf, &cfg).map_err(|e| e.to_string())?;
                Ok(serde_json::json!({
                    "state": state,
                    "changed": buf.edits() > 0,
                    "text": buf.text(),
                }))
            }
            "toc/outline" => {
                let outcome = self.run_command(&mut buf, &settings, Args::outline());
                Ok(serde_json::json!({
                    "state": outcome.sync,
                    "changed": buf.edits() > 0,
                    "text": buf.text(),
                    "titles": outcome.listed,
                    "items": scan::labels(&outcome.listed),
                }))
            }
            "toc/select" => {
                let index = params.index.ok_or("missing required parameter: index")?;
                let jumped =
                    TableOfComments::on_selected(&mut buf, &cfg, command::picked_index(index));
                Ok(landing(&buf, jumped))
            }
            "toc/move" => {
                let direction = params
                    .direction
                    .ok_or("missing required parameter: direction")?;
                let outcome = self.run_command(&mut buf, &settings, Args::moving(direction));
                Ok(landing(&buf, outcome.jumped))
            }
            _ => Err(format!("unknown method: {method}")),
        }
    }

    fn run_command(
        &self,
        buf: &mut TextBuffer,
        settings: &TomlSettings,
        args: Args,
    ) -> command::Outcome {
        let mut ctx = Context {
            editor: buf,
            panel: &mut Dismiss,
            settings,
        };
        self.commands
            .run(TableOfComments::NAME, &mut ctx, &args)
            .unwrap_or_default()
    }

    fn settings_for(&self, overrides: &Map<String, Value>) -> TomlSettings {
        let mut table = toml::Table::new();
        for (key, value) in overrides {
            match toml::Value::try_from(value) {
                Ok(v) => {
                    table.insert(key.clone(), v);
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "ignoring setting"),
            }
        }
        self.settings.clone().layer(TomlSettings::from_table(table))
    }
}

fn landing(buf: &TextBuffer, jumped: Option<Title>) -> Value {
    let cursor = jumped.as_ref().and(buf.cursor()).map(|(line, col)| Position { line, col });
    serde_json::json!({
        "title": jumped,
        "cursor": cursor,
    })
}
