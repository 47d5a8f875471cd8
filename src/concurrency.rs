use anyhow::{Context, anyhow};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait Spawner {
    fn spawn<F>(&self, job: F) -> anyhow::Result<()>
    where
        F: FnOnce() + Send + 'static;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPerConnection;

impl Spawner for ThreadPerConnection {
    fn spawn<F>(&self, job: F) -> anyhow::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new()
            .name("connection".to_string())
            .spawn(job)
            .context("Failed to spawn connection thread")?;
        Ok(())
    }
}

struct Worker {
    id: usize,
    thread: thread::JoinHandle<()>,
}

impl Worker {
    fn new(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) -> anyhow::Result<Worker> {
        let thread = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || {
                loop {
                    let message = match receiver.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    match message {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                }
            })
            .context("Failed to spawn worker thread")?;

        Ok(Worker { id, thread })
    }
}

pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        drop(self.sender.take());

        for worker in self.workers.drain(..) {
            debug!(worker = worker.id, "shutting down worker");
            if worker.thread.join().is_err() {
                warn!(worker = worker.id, "worker panicked");
            }
        }
    }
}

impl ThreadPool {
    pub fn new(size: usize) -> anyhow::Result<Self> {
        if size == 0 {
            return Err(anyhow!("Thread pool needs at least one worker"));
        }

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| Worker::new(id, Arc::clone(&receiver)))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(ThreadPool {
            workers,
            sender: Some(sender),
        })
    }
}

impl Spawner for ThreadPool {
    fn spawn<F>(&self, job: F) -> anyhow::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let job = Box::new(job) as Job;
        self.sender
            .as_ref()
            .ok_or(anyhow!("Thread pool is shut down"))?
            .send(job)
            .map_err(|_| anyhow!("All workers have exited"))
    }
}
