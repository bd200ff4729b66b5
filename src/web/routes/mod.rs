pub mod tag_routes;
