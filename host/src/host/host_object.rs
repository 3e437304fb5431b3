use super::caller_state::HostState;
use crate::allocator::{BumpAllocator, WASM_PAGE_SIZE};
use crate::error::HostError;
use crate::host_calls::allocator::{host_free, host_malloc};
use crate::host_calls::print::host_print;
use anyhow::anyhow;
use tracing::{debug, info};
use wasmtime::{Config, Engine, Func, Instance, Linker, MemoryType, Module, SharedMemory, Store};
use wasmparser::{Validator, WasmFeatures};

pub struct GuestHostConfig {
    /// Size of the linear memory region, in 64 KiB wasm pages. Fixed for the
    /// process lifetime; the region never grows.
    pub initial_pages: u32,
}

impl GuestHostConfig {
    pub fn default() -> Self {
        // 17 pages is the smallest region the sample guest runs in.
        Self { initial_pages: 17 }
    }

    pub fn capacity_bytes(&self) -> u32 {
        self.initial_pages.saturating_mul(WASM_PAGE_SIZE)
    }
}

pub struct GuestHost {
    pub engine: Engine,
    pub store: Store<HostState>,
    pub linker: Linker<HostState>,
    instance: Option<Instance>,
}

impl GuestHost {
    /// Builds the execution environment: the linear memory region plus the
    /// host function surface, wired into a linker before any guest exists.
    /// The allocator goes in uninitialized; it only becomes usable once
    /// [`load_guest`](Self::load_guest) has read the guest's heap base.
    pub fn new(config: GuestHostConfig) -> Result<Self, HostError> {
        let mut wasm_config = Config::new();
        // Shared memories sit behind the threads proposal, even though this
        // host never runs a second thread.
        wasm_config.wasm_threads(true);
        let engine = Engine::new(&wasm_config).map_err(|e| HostError::Environment(e.into()))?;

        // --- 1. LINEAR MEMORY REGION ---
        // min == max: the guest addresses exactly this many pages, forever.
        let pages = config.initial_pages;
        let memory = SharedMemory::new(&engine, MemoryType::shared(pages, pages)).map_err(|e| {
            HostError::ResourceExhausted {
                pages,
                source: e.into(),
            }
        })?;

        let initial_state = HostState {
            shared_memory: memory.clone(),
            allocator: BumpAllocator::new(config.capacity_bytes()),
        };

        let store = Store::new(&engine, initial_state);
        let mut linker = Linker::new(&engine);

        // --- 2. ENVIRONMENT RECORD ---
        // `malloc` must already resolve at instantiation time even though its
        // cursor is not negotiated yet; instantiation wires all imports at
        // once.
        wire_env(&mut linker, &store, memory).map_err(|e| HostError::Environment(e.into()))?;

        Ok(Self {
            engine,
            store,
            linker,
            instance: None,
        })
    }

    /// Loads the one guest this host will ever run, in the order the memory
    /// contract requires: validate, instantiate, read `__heap_base`, arm the
    /// allocator, then let guest startup code run.
    pub fn load_guest(&mut self, name: &str, wasm_bytes: &[u8]) -> Result<Instance, HostError> {
        if self.instance.is_some() {
            return Err(HostError::InstantiationFailed(
                anyhow!("a guest is already resident").into(),
            ));
        }
        info!(guest = name, bytes = wasm_bytes.len(), "loading guest module");

        // Reject malformed binaries before handing them to the JIT.
        let mut validator =
            Validator::new_with_features(WasmFeatures::default() | WasmFeatures::THREADS);
        validator
            .validate_all(wasm_bytes)
            .map_err(|e| HostError::InstantiationFailed(Box::new(e)))?;

        let module = Module::new(&self.engine, wasm_bytes)
            .map_err(|e| HostError::InstantiationFailed(e.into()))?;
        let instance = self
            .linker
            .instantiate(&mut self.store, &module)
            .map_err(|e| HostError::InstantiationFailed(e.into()))?;

        // The guest tells us where its static data ends and heap begins.
        let heap_base = instance
            .get_global(&mut self.store, "__heap_base")
            .and_then(|g| g.get(&mut self.store).i32())
            .ok_or_else(|| HostError::MissingExport("__heap_base".to_string()))?
            as u32;

        let capacity = self.store.data().allocator.capacity();
        if heap_base > capacity {
            return Err(HostError::InstantiationFailed(
                anyhow!("heap base {heap_base:#x} lies beyond the {capacity} byte region").into(),
            ));
        }

        self.store.data_mut().allocator.apply_heap_base(heap_base);
        debug!(heap_base, "allocator armed");

        // Startup hooks run only now that the cursor is valid, so they may
        // allocate. A `start` section that reaches `malloc` earlier traps
        // during instantiation above.
        for hook in ["__wasm_call_ctors", "init"] {
            if let Some(func) = instance.get_func(&mut self.store, hook) {
                func.typed::<(), ()>(&self.store)
                    .and_then(|f| f.call(&mut self.store, ()))
                    .map_err(|e| HostError::InstantiationFailed(e.into()))?;
                debug!(hook, "guest startup hook ran");
            }
        }

        self.instance = Some(instance);
        Ok(instance)
    }

    pub fn get_func(&mut self, func_name: &str) -> Result<Func, HostError> {
        let instance = self
            .instance
            .ok_or_else(|| HostError::InstantiationFailed(anyhow!("no guest resident").into()))?;
        instance
            .get_func(&mut self.store, func_name)
            .ok_or_else(|| HostError::MissingExport(func_name.to_string()))
    }

    pub fn allocator(&self) -> &BumpAllocator {
        &self.store.data().allocator
    }

    pub fn read_mem(&mut self, ptr: i32, len: i32) -> anyhow::Result<Vec<u8>> {
        let memory = &self.store.data().shared_memory;

        // Wasmtime hands shared memory out as &[UnsafeCell<u8>].
        let data_cells = memory.data();

        // SAFETY: this host is single-threaded relative to the wasm
        // execution; nothing mutates the region while we copy.
        let data: &[u8] = unsafe {
            std::slice::from_raw_parts(data_cells.as_ptr() as *const u8, data_cells.len())
        };

        if ptr < 0 || len < 0 {
            anyhow::bail!("memory read out of bounds: negative offset");
        }
        let start = ptr as usize;
        let end = start + len as usize;
        if end > data.len() {
            anyhow::bail!("memory read out of bounds: {} > {}", end, data.len());
        }

        Ok(data[start..end].to_vec())
    }

    pub fn write_mem(&mut self, ptr: i32, data: &[u8]) -> anyhow::Result<()> {
        let memory = &self.store.data().shared_memory;
        let mem_cells = memory.data();

        // SAFETY: same single-threaded argument as read_mem.
        let mem_slice: &mut [u8] = unsafe {
            std::slice::from_raw_parts_mut(mem_cells.as_ptr() as *mut u8, mem_cells.len())
        };

        if ptr < 0 {
            anyhow::bail!("memory write out of bounds");
        }
        let start = ptr as usize;
        let end = start + data.len();
        if end > mem_slice.len() {
            anyhow::bail!("memory write out of bounds");
        }

        mem_slice[start..end].copy_from_slice(data);
        Ok(())
    }
}

fn wire_env(
    linker: &mut Linker<HostState>,
    store: &Store<HostState>,
    memory: SharedMemory,
) -> anyhow::Result<()> {
    linker.define(store, "env", "memory", memory)?;
    linker.func_wrap("env", "malloc", host_malloc)?;
    linker.func_wrap("env", "free", host_free)?;
    linker.func_wrap("env", "host_print", host_print)?;
    Ok(())
}
