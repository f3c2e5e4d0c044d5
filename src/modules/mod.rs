pub mod books;
pub mod uploads;

use shelf_kernel::ModuleRegistry;
use shelf_storage::DynUploadSigner;

use books::repository::DynCatalogRepository;

/// Backends the domain modules are wired to.
#[derive(Clone)]
pub struct Services {
    pub catalog: DynCatalogRepository,
    pub uploads: DynUploadSigner,
}

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &Services) {
    registry.register_custom(books::create_module(services.catalog.clone()));
    registry.register_custom(uploads::create_module(services.uploads.clone()));
}
