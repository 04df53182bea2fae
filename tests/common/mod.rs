//! Common test utilities and helpers

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `sh.status()` output of a two-shard cluster.
pub const STATUS_OUTPUT: &str = r#"--- Sharding Status ---
  sharding version: {
	"_id" : 1,
	"minCompatibleVersion" : 5,
	"currentVersion" : 6,
	"clusterId" : ObjectId("5a0b6a4e2b1f1c0d9c1e2f3a")
  }
  shards:
	{  "_id" : "shard01",  "host" : "rs1/h1:27018,h2:27018",  "state" : 1 }
	{  "_id" : "shard02",  "host" : "rs2/h3:27018",  "state" : 1 }
  active mongoses:
	"3.4.10" : 1
  balancer:
	Currently enabled:  yes
	Currently running:  no
  databases:
	{  "_id" : "app",  "primary" : "shard01",  "partitioned" : true }
		app.users
			shard key: { "uid" : 1 }
			chunks:
				shard01	1
			{ "uid" : { "$minKey" : 1 } } -->> { "uid" : { "$maxKey" : 1 } } on : shard01 Timestamp(1, 0)
	{"_id":"shard01","shards":[{"app.users":{"shardkey":{"uid":1}}},{"app.orders":{"shardkey":{"region":1,"ts":-1}}}]}
	{"_id":"shard02","shards":[{"app.events":{"shardkey":{"_id":"hashed"}}}]}
"#;

/// Scratch directory that doubles as an empty config home
pub struct TestEnv {
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Executable standing in for the `mongo` shell. It ignores its
    /// arguments, prints the given output and exits with `code`.
    #[cfg(unix)]
    pub fn fake_shell(&self, stdout: &str, stderr: &str, code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let out = self.write("shell.out", stdout);
        let err = self.write("shell.err", stderr);
        let script = format!(
            "#!/bin/sh\ncat '{}'\ncat '{}' >&2\nexit {}\n",
            out.display(),
            err.display(),
            code
        );
        let path = self.write("fake-mongo", &script);
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// `shardctl` with an isolated config home and no `SHARDCTL_*` variables
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("shardctl").unwrap();
        cmd.env("XDG_CONFIG_HOME", self.path())
            .env("HOME", self.path())
            .env_remove("SHARDCTL_MONGO")
            .env_remove("SHARDCTL_HOST")
            .env_remove("SHARDCTL_CONTEXT")
            .env_remove("SHARDCTL_MAX_RETRIES")
            .env_remove("SHARDCTL_LOG_LEVEL");
        cmd
    }
}
