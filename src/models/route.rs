use std::fmt;
use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use super::GatewaySet;

/// Route table the sync process is allowed to mutate
pub type RouteTableId = u32;

/// Destination network of a route (NLRI)
///
/// Compared as a string after normalization; `10.0.0.1/24` and `10.0.0.0/24`
/// are different prefixes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prefix(String);

impl Prefix {
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim();
        // Bare addresses would otherwise gain a /32 or /128
        if !prefix.contains('/') {
            return Self(prefix.to_string());
        }
        match prefix.parse::<IpNetwork>() {
            Ok(network) => Self(network.to_string()),
            Err(_) => Self(prefix.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Prefix {
    fn from(prefix: &str) -> Self {
        Self::new(prefix)
    }
}

/// Next hop address a prefix is reachable through
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gateway(String);

impl Gateway {
    pub fn new(gateway: &str) -> Self {
        let gateway = gateway.trim();
        match gateway.parse::<IpAddr>() {
            Ok(addr) => Self(addr.to_string()),
            Err(_) => Self(gateway.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Gateway {
    fn from(gateway: &str) -> Self {
        Self::new(gateway)
    }
}

/// A route as currently persisted in the route store
///
/// `destination` is normalized for comparison with desired state, while
/// `stored_as` is the destination exactly as the store keys it and is what
/// gets sent back when deleting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreRoute {
    pub destination: Prefix,
    pub stored_as: String,
    pub gateways: GatewaySet,
}

impl StoreRoute {
    pub fn new(destination: Prefix, gateways: GatewaySet) -> Self {
        Self {
            stored_as: destination.to_string(),
            destination,
            gateways,
        }
    }

    /// Route as listed by a store, keeping its destination verbatim
    pub fn stored(destination: &str, gateways: GatewaySet) -> Self {
        Self {
            destination: Prefix::new(destination),
            stored_as: destination.to_string(),
            gateways,
        }
    }
}

impl fmt::Display for StoreRoute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} via {}", self.stored_as, self.gateways)
    }
}

/// Wire representation of a route for the route table service
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Route {
    pub route_table_id: RouteTableId,
    pub destination: String,
    #[serde(default = "Vec::new")]
    pub gateways: Vec<String>,
}

impl Route {
    pub fn new(table: RouteTableId, destination: &Prefix, gateways: &GatewaySet) -> Self {
        Self {
            route_table_id: table,
            destination: destination.to_string(),
            gateways: gateways.iter().map(|g| g.to_string()).collect(),
        }
    }
}

impl From<Route> for StoreRoute {
    fn from(route: Route) -> Self {
        let gateways = route.gateways.iter().map(|g| Gateway::new(g)).collect();
        StoreRoute::stored(&route.destination, gateways)
    }
}

/// Wire key of a single route
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteIdentifier {
    pub route_table_id: RouteTableId,
    pub destination: String,
}

impl RouteIdentifier {
    pub fn new(table: RouteTableId, destination: &str) -> Self {
        Self {
            route_table_id: table,
            destination: destination.to_string(),
        }
    }
}
