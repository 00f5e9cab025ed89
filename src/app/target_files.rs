use crate::args::{AddArgs, CreateArgs, RemoveArgs};
use crate::error::AppResult;
use crate::targets::{Target, TargetStore};

pub(crate) fn run_create(args: &CreateArgs, targets_dir: &str) -> AppResult<()> {
    let store = TargetStore::new(targets_dir);
    let path = store.create(&args.file)?;
    println!("Created {}", path.display());
    Ok(())
}

pub(crate) fn run_add(args: &AddArgs, targets_dir: &str) -> AppResult<()> {
    let target = Target::new(&args.url, args.count)?;
    let store = TargetStore::new(targets_dir);
    let path = store.add(&args.file, &target)?;
    println!(
        "Added {} {} to {}",
        target.url(),
        target.repeat_count(),
        path.display()
    );
    Ok(())
}

pub(crate) fn run_remove(args: &RemoveArgs, targets_dir: &str) -> AppResult<()> {
    let store = TargetStore::new(targets_dir);
    let path = store.remove(&args.file)?;
    println!("Removed {}", path.display());
    Ok(())
}
