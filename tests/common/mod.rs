//! In-memory stand-ins for a GitHub host and the git tool.

#![allow(dead_code)]

use git_mover::prelude::*;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

pub const SOURCE_HOST: &str = "https://github.com";
pub const DESTINATION_HOST: &str = "https://ghe.example.com";

/// A request seen by a [`FakeHost`].
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub username: String,
}

#[derive(Default)]
struct HostState {
    routes: HashMap<(Method, String), VecDeque<ApiResponse>>,
    calls: Vec<Call>,
}

/// A scripted host. Responses for a route are served in order, the last one
/// repeating; unrouted requests get 404.
#[derive(Clone, Default)]
pub struct FakeHost {
    state: Rc<RefCell<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.state
            .borrow_mut()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse::new(status, body.to_string()));
        self
    }

    /// Route the first page of a list endpoint.
    pub fn respond_list(&self, path: &str, items: Value) -> &Self {
        self.respond(Method::Get, &list_path(path), 200, items)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    pub fn count(&self, method: Method) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn gateway(&self, host: &str, username: &str, token: &str) -> ApiGateway {
        let config = HostConfig::new(host, Credentials::new(username, token)).unwrap();
        ApiGateway::new(config, Box::new(self.clone())).with_pre_delay(Duration::ZERO)
    }
}

impl Transport for FakeHost {
    fn execute(&self, request: &ApiRequest<'_>) -> git_mover::Result<ApiResponse> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call {
            method: request.method,
            path: request.path.to_string(),
            body: request.body.cloned(),
            username: request.credentials.username.clone(),
        });

        let key = (request.method, request.path.to_string());
        let response = match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse::new(404, r#"{"message":"Not Found"}"#)))
    }
}

pub fn list_path(path: &str) -> String {
    format!("{}?per_page=100&page=1", path)
}

pub fn repo_json(owner: &str, name: &str, host: &str) -> Value {
    json!({
        "id": 1,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "description": "Widgets for everyone",
        "homepage": "https://widgets.example.com",
        "private": true,
        "archived": false,
        "disabled": false,
        "clone_url": format!("{}/{}/{}.git", host, owner, name),
    })
}

#[derive(Default)]
struct VcsState {
    available: bool,
    clone_fails: bool,
    push_fails: bool,
    clones: Vec<(String, PathBuf)>,
    pushes: Vec<(String, PathBuf)>,
}

/// A version control tool that records calls instead of running git.
#[derive(Clone)]
pub struct RecordingVcs {
    state: Rc<RefCell<VcsState>>,
}

impl RecordingVcs {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(VcsState {
                available: true,
                ..VcsState::default()
            })),
        }
    }

    pub fn fail_clone(&self) {
        self.state.borrow_mut().clone_fails = true;
    }

    pub fn fail_push(&self) {
        self.state.borrow_mut().push_fails = true;
    }

    pub fn clones(&self) -> Vec<(String, PathBuf)> {
        self.state.borrow().clones.clone()
    }

    pub fn pushes(&self) -> Vec<(String, PathBuf)> {
        self.state.borrow().pushes.clone()
    }
}

impl VersionControl for RecordingVcs {
    fn name(&self) -> &str {
        "fake-git"
    }

    fn is_available(&self) -> bool {
        self.state.borrow().available
    }

    fn clone_bare(&self, url: &str, dir: &Path) -> git_mover::Result<bool> {
        assert!(dir.is_dir(), "clone target must exist during the clone");
        let mut state = self.state.borrow_mut();
        state.clones.push((url.to_string(), dir.to_path_buf()));
        Ok(!state.clone_fails)
    }

    fn push_mirror(&self, url: &str, dir: &Path) -> git_mover::Result<bool> {
        let mut state = self.state.borrow_mut();
        state.pushes.push((url.to_string(), dir.to_path_buf()));
        Ok(!state.push_fails)
    }
}

/// Source host, destination host and git fake wired into a migrator.
pub struct Harness {
    pub source: FakeHost,
    pub destination: FakeHost,
    pub vcs: RecordingVcs,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            source: FakeHost::new(),
            destination: FakeHost::new(),
            vcs: RecordingVcs::new(),
        }
    }

    pub fn migrator(&self) -> Migrator {
        Migrator::new(
            self.source.gateway(SOURCE_HOST, "alice", "src-token"),
            self.destination.gateway(DESTINATION_HOST, "bob", "dst-token"),
            Box::new(self.vcs.clone()),
        )
    }
}
