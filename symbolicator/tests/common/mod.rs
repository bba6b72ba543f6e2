#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use symbolicator::domain::ToolError;
use symbolicator::symbolization::{SymbolTools, DWARF_SUBPATH};

pub const FOO_UUID: &str = "5A6B7C8D-1111-2222-3333-444455556666";
pub const NETWORKING_UUID: &str = "0F0E0D0C-AAAA-BBBB-CCCC-DDDDEEEEFFFF";

pub const CRASH_REPORT: &str = "\
Process:               Foo [4821]
Path:                  /Applications/Foo.app/Contents/MacOS/Foo
Identifier:            com.acme.Foo
Version:               1.0 (1)
Parent Process:        launchd [1]

Exception Type:        EXC_BAD_ACCESS (SIGSEGV)

Thread 0 Crashed:: Dispatch queue: com.apple.main-thread
0   com.acme.Foo.Networking       0x000000010f001234 0x10f000000 + 4660
1   com.acme.Foo                  0x000000010e8c6f43 0x10e8c5000 + 7999
2   Foo                           0x000000010e8c7001 Foo + 8193
3   libdyld.dylib                 0x00007fff2030af3d start + 1

Binary Images:
       0x10e8c5000 -        0x10e8d0fff +com.acme.Foo (1.0 - 1) <5A6B7C8D-1111-2222-3333-444455556666> /Applications/Foo.app/Contents/MacOS/Foo
       0x10f000000 -        0x10f00ffff +com.acme.Foo.Networking (1.0 - 1) <0F0E0D0C-AAAA-BBBB-CCCC-DDDDEEEEFFFF> /Applications/Foo.app/Contents/Frameworks/Networking.framework/Networking
    0x7fff2030a000 -     0x7fff2030bfff  libdyld.dylib (852) <AAAA0000-0000-0000-0000-000000000000> /usr/lib/system/libdyld.dylib
";

pub const SAMPLE_REPORT: &str = "\
Analysis of sampling Foo (pid 4821) every 1 millisecond
Process:         Foo [4821]
Path:            /Applications/Foo.app/Contents/MacOS/Foo
Load Address:    0x10a1b0000
Identifier:      com.acme.Foo
Version:         1.0 (1)
Parent Process:  launchd [1]

Call graph:
    2331 Thread_1234   DispatchQueue_1: com.apple.main-thread  (serial)
    + 2331 start  (in libdyld.dylib) + 1  [0x7fff2030af3d]
    +   2331 ???  (in Foo)  load address 0x10a1b0000 + 0x1234  [0x10a1b1234]
    +     2331 ???  (in Networking)  load address 0x10c000000 + 0x56  [0x10c000056]

Binary Images:
       0x10a1b0000 -        0x10a1bffff +com.acme.Foo (1.0 - 1) <5A6B7C8D-1111-2222-3333-444455556666> /Applications/Foo.app/Contents/MacOS/Foo
       0x10c000000 -        0x10c00ffff +com.acme.Foo.Networking (1.0 - 1) <0F0E0D0C-AAAA-BBBB-CCCC-DDDDEEEEFFFF> /Applications/Foo.app/Contents/Frameworks/Networking.framework/Networking
";

/// One `symbolicate` request as the fake saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveCall {
    pub binary: PathBuf,
    pub load_address: String,
    pub addresses: Vec<String>,
}

/// How the fake resolver answers `symbolicate`
#[derive(Clone, Default)]
enum ResolverBehaviour {
    #[default]
    Table,
    Exit(String),
    Silent,
}

/// Resolver double: answers from tables and records every request
#[derive(Clone, Default)]
pub struct FakeTools {
    uuids: HashMap<String, String>,
    symbols: HashMap<String, String>,
    resolver: ResolverBehaviour,
    uuid_calls: Arc<AtomicUsize>,
    resolve_calls: Arc<Mutex<Vec<ResolveCall>>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// `dwarfdump`-style answer for binaries named `binary_name`
    pub fn with_uuid(mut self, binary_name: &str, uuid: &str) -> Self {
        self.uuids.insert(binary_name.to_string(), uuid.to_string());
        self
    }

    pub fn with_symbol(mut self, address: &str, symbol: &str) -> Self {
        self.symbols.insert(address.to_string(), symbol.to_string());
        self
    }

    /// The resolver exits non-zero with `stderr`
    pub fn with_failing_resolver(mut self, stderr: &str) -> Self {
        self.resolver = ResolverBehaviour::Exit(stderr.to_string());
        self
    }

    /// The resolver exits cleanly but prints nothing
    pub fn with_silent_resolver(mut self) -> Self {
        self.resolver = ResolverBehaviour::Silent;
        self
    }

    pub fn uuid_calls(&self) -> usize {
        self.uuid_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> Vec<ResolveCall> {
        self.resolve_calls.lock().unwrap().clone()
    }
}

impl SymbolTools for FakeTools {
    async fn symbolicate(
        &self,
        binary: &Path,
        load_address: &str,
        addresses: &[String],
    ) -> Result<String, ToolError> {
        self.resolve_calls.lock().unwrap().push(ResolveCall {
            binary: binary.to_path_buf(),
            load_address: load_address.to_string(),
            addresses: addresses.to_vec(),
        });
        match &self.resolver {
            ResolverBehaviour::Table => {}
            ResolverBehaviour::Exit(stderr) => {
                return Err(ToolError::NonZeroExit {
                    tool: "atos".to_string(),
                    status: Some(1),
                    stderr: stderr.clone(),
                });
            }
            ResolverBehaviour::Silent => return Ok(String::new()),
        }
        let mut output = String::new();
        for address in addresses {
            output.push_str(self.symbols.get(address).unwrap_or(address));
            output.push('\n');
        }
        Ok(output)
    }

    async fn extract_uuid(&self, binary: &Path) -> Result<String, ToolError> {
        self.uuid_calls.fetch_add(1, Ordering::SeqCst);
        let name = binary.file_name().unwrap().to_string_lossy().into_owned();
        let uuid = self.uuids.get(&name).cloned().unwrap_or_default();
        Ok(format!("UUID: {uuid} (x86_64) {}\n", binary.display()))
    }
}

/// `<root>/<name>.<ext>.dSYM/Contents/Resources/DWARF/<name>`
pub fn write_bundle(root: &Path, name: &str, ext: &str) -> PathBuf {
    let dir = root.join(format!("{name}.{ext}.dSYM"));
    let dwarf = dir.join(DWARF_SUBPATH);
    fs::create_dir_all(&dwarf).unwrap();
    fs::write(dwarf.join(name), b"\xcf\xfa\xed\xfe").unwrap();
    dir
}

pub fn write_report(root: &Path, file_name: &str, text: &str) -> PathBuf {
    let path = root.join(file_name);
    fs::write(&path, text).unwrap();
    path
}

pub fn foo_tools() -> FakeTools {
    FakeTools::new().with_uuid("Foo", FOO_UUID).with_uuid("Networking", NETWORKING_UUID)
}
