//! Sentinel-2 NDVI production: band file discovery, canonical output naming and a
//! failure-isolating batch pipeline over GDAL rasters.

pub mod config;
pub mod discovery;
pub mod naming;
pub mod ndvi;
pub mod product;
pub mod raster;
pub mod raster_io;
