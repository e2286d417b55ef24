pub mod commands;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use vitrine_db::{DocumentStore, IndexDefinition};
use vitrine_kernel::{settings::UpdateMode, InitCtx, Module};

use handlers::ProductHandlers;

/// Product catalog: create, update, remove and list products
pub struct ProductsModule {
    handlers: ProductHandlers,
}

impl ProductsModule {
    pub fn new(store: DocumentStore, update_mode: UpdateMode) -> Self {
        Self {
            handlers: ProductHandlers::new(repository::product_repository(store), update_mode),
        }
    }

    pub fn handlers(&self) -> &ProductHandlers {
        &self.handlers
    }
}

#[async_trait]
impl Module for ProductsModule {
    fn name(&self) -> &'static str {
        "products"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            update_mode = ?self.handlers.update.mode(),
            "products module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.handlers.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let envelope = serde_json::json!({
            "200": {
                "description": "Outcome of the command; failures are listed in notifications",
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/GenericResponse" }
                    }
                }
            },
            "400": {
                "description": "Unreadable request body",
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            },
            "422": {
                "description": "Request body does not match the command shape",
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            }
        });
        let body = |schema: &str| {
            serde_json::json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                    }
                }
            })
        };

        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List products",
                        "tags": ["Products"],
                        "responses": {
                            "200": {
                                "description": "All stored products",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Product" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a product",
                        "tags": ["Products"],
                        "requestBody": body("CreateProductCommand"),
                        "responses": envelope.clone()
                    },
                    "put": {
                        "summary": "Update a product by id",
                        "tags": ["Products"],
                        "requestBody": body("UpdateProductCommand"),
                        "responses": envelope.clone()
                    },
                    "delete": {
                        "summary": "Remove a product by title",
                        "tags": ["Products"],
                        "requestBody": body("RemoveProductCommand"),
                        "responses": envelope
                    }
                }
            },
            "components": {
                "schemas": {
                    "Product": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Store-assigned identity" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "price": { "type": "number", "minimum": 0 },
                            "active": { "type": "boolean" }
                        },
                        "required": ["id", "title", "description", "price", "active"]
                    },
                    "CreateProductCommand": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": models::TITLE_MAX_LEN },
                            "description": { "type": "string", "maxLength": models::DESCRIPTION_MAX_LEN },
                            "price": { "type": "number", "minimum": 0 },
                            "active": { "type": "boolean" }
                        },
                        "required": ["title", "price"]
                    },
                    "UpdateProductCommand": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "price": { "type": "number", "minimum": 0 },
                            "active": { "type": "boolean" }
                        },
                        "required": ["id"]
                    },
                    "RemoveProductCommand": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" }
                        },
                        "required": ["title"]
                    }
                }
            }
        }))
    }

    fn indexes(&self) -> Vec<IndexDefinition> {
        vec![repository::title_index()]
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let stored = ctx
            .db
            .count(repository::COLLECTION, &vitrine_db::Filter::All)
            .await?;
        tracing::info!(module = self.name(), stored, "products module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "products module stopped");
        Ok(())
    }
}

/// Create a new instance of the products module
pub fn create_module(store: DocumentStore, update_mode: UpdateMode) -> std::sync::Arc<ProductsModule> {
    std::sync::Arc::new(ProductsModule::new(store, update_mode))
}
