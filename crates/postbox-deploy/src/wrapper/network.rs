//! Network wrapper: VPC, subnets, routing, security groups, and the
//! Secrets Manager interface endpoint.
//!
//! Layout: three private subnets each for Lambda and the database, one
//! public subnet for the bastion, three public subnets for the interface
//! endpoint, all across three availability zones. No NAT gateways; the
//! only paths out are the internet gateway (public subnets) and the
//! interface endpoint (Lambda to Secrets Manager).

use serde_json::{Value, json};

use postbox_types::config::REGION;

use crate::stack::{DeployError, ResourceHandle, Stack};

const IP_PROTOCOL: &str = "tcp";
pub const DB_PORT: u16 = 3306;
const HTTPS_PORT: u16 = 443;
const HTTP_PORT: u16 = 80;

const VPC_CIDR: &str = "10.0.0.0/16";

struct SubnetSpec {
    name_suffix: &'static str,
    availability_zone: &'static str,
    cidr_block: &'static str,
}

const LAMBDA_SUBNETS: [SubnetSpec; 3] = [
    SubnetSpec {
        name_suffix: "lambda-subnet1",
        availability_zone: "ap-northeast-1a",
        cidr_block: "10.0.0.0/24",
    },
    SubnetSpec {
        name_suffix: "lambda-subnet2",
        availability_zone: "ap-northeast-1c",
        cidr_block: "10.0.1.0/24",
    },
    SubnetSpec {
        name_suffix: "lambda-subnet3",
        availability_zone: "ap-northeast-1d",
        cidr_block: "10.0.2.0/24",
    },
];

const DB_SUBNETS: [SubnetSpec; 3] = [
    SubnetSpec {
        name_suffix: "db-subnet1",
        availability_zone: "ap-northeast-1a",
        cidr_block: "10.0.10.0/24",
    },
    SubnetSpec {
        name_suffix: "db-subnet2",
        availability_zone: "ap-northeast-1c",
        cidr_block: "10.0.11.0/24",
    },
    SubnetSpec {
        name_suffix: "db-subnet3",
        availability_zone: "ap-northeast-1d",
        cidr_block: "10.0.12.0/24",
    },
];

const BASTION_SUBNET: SubnetSpec = SubnetSpec {
    name_suffix: "bastion-subnet1",
    availability_zone: "ap-northeast-1a",
    cidr_block: "10.0.20.0/24",
};

const ENDPOINT_SUBNETS: [SubnetSpec; 3] = [
    SubnetSpec {
        name_suffix: "endpoint-subnet1",
        availability_zone: "ap-northeast-1a",
        cidr_block: "10.0.30.0/24",
    },
    SubnetSpec {
        name_suffix: "endpoint-subnet2",
        availability_zone: "ap-northeast-1c",
        cidr_block: "10.0.31.0/24",
    },
    SubnetSpec {
        name_suffix: "endpoint-subnet3",
        availability_zone: "ap-northeast-1d",
        cidr_block: "10.0.32.0/24",
    },
];

/// Handles exposed to the wrappers that build on the network.
pub struct NetworkWrapper {
    pub vpc: ResourceHandle,
    pub lambda_subnets: Vec<ResourceHandle>,
    pub db_subnets: Vec<ResourceHandle>,
    pub bastion_subnet: ResourceHandle,
    pub bastion_availability_zone: String,
    pub lambda_security_group: ResourceHandle,
    pub db_security_group: ResourceHandle,
    pub bastion_security_group: ResourceHandle,
}

impl NetworkWrapper {
    pub fn build(stack: &mut Stack) -> Result<Self, DeployError> {
        let vpc = create_vpc(stack)?;

        let lambda_subnets = LAMBDA_SUBNETS
            .iter()
            .map(|spec| create_subnet(stack, &vpc, spec, false))
            .collect::<Result<Vec<_>, _>>()?;
        let db_subnets = DB_SUBNETS
            .iter()
            .map(|spec| create_subnet(stack, &vpc, spec, false))
            .collect::<Result<Vec<_>, _>>()?;
        let bastion_subnet = create_subnet(stack, &vpc, &BASTION_SUBNET, true)?;
        let endpoint_subnets = ENDPOINT_SUBNETS
            .iter()
            .map(|spec| create_subnet(stack, &vpc, spec, true))
            .collect::<Result<Vec<_>, _>>()?;

        let igw = create_internet_gateway(stack, &vpc)?;
        route_to_internet_gateway(stack, &vpc, &igw.gateway, &igw.attachment, &bastion_subnet, &BASTION_SUBNET)?;
        for (subnet, spec) in endpoint_subnets.iter().zip(ENDPOINT_SUBNETS.iter()) {
            route_to_internet_gateway(stack, &vpc, &igw.gateway, &igw.attachment, subnet, spec)?;
        }

        let lambda_security_group = create_security_group(stack, &vpc, "lambda-sg")?;
        let db_security_group = create_security_group(stack, &vpc, "db-sg")?;
        let bastion_security_group = create_security_group(stack, &vpc, "bastion-sg")?;
        let endpoint_security_group = create_security_group(stack, &vpc, "endpoint-sg")?;

        create_ingress(stack, "lambda-db-ingress", &lambda_security_group, &db_security_group, DB_PORT)?;
        create_ingress(stack, "bastion-db-ingress", &bastion_security_group, &db_security_group, DB_PORT)?;
        create_ingress(stack, "lambda-endpoint-ingress", &lambda_security_group, &endpoint_security_group, HTTPS_PORT)?;

        create_egress(stack, "lambda-db-egress", &lambda_security_group, &db_security_group, DB_PORT)?;
        create_egress(stack, "bastion-db-egress", &bastion_security_group, &db_security_group, DB_PORT)?;
        create_egress(stack, "lambda-endpoint-egress", &lambda_security_group, &endpoint_security_group, HTTPS_PORT)?;
        create_anywhere_egress(stack, "bastion-http-egress", &bastion_security_group, HTTP_PORT)?;
        create_anywhere_egress(stack, "bastion-https-egress", &bastion_security_group, HTTPS_PORT)?;

        create_secretsmanager_endpoint(stack, &vpc, &endpoint_subnets, &endpoint_security_group)?;

        Ok(Self {
            vpc,
            lambda_subnets,
            db_subnets,
            bastion_subnet,
            bastion_availability_zone: BASTION_SUBNET.availability_zone.to_string(),
            lambda_security_group,
            db_security_group,
            bastion_security_group,
        })
    }
}

fn name_tag(name: &str) -> Value {
    json!([{ "Key": "Name", "Value": name }])
}

fn create_vpc(stack: &mut Stack) -> Result<ResourceHandle, DeployError> {
    let name = stack.resource_name("vpc");
    stack.add_resource(
        "vpc",
        "AWS::EC2::VPC",
        json!({
            "CidrBlock": VPC_CIDR,
            "EnableDnsSupport": true,
            "EnableDnsHostnames": true,
            "Tags": name_tag(&name),
        }),
    )
}

fn create_subnet(
    stack: &mut Stack,
    vpc: &ResourceHandle,
    spec: &SubnetSpec,
    public: bool,
) -> Result<ResourceHandle, DeployError> {
    let name = stack.resource_name(spec.name_suffix);
    stack.add_resource(
        spec.name_suffix,
        "AWS::EC2::Subnet",
        json!({
            "VpcId": vpc.reference(),
            "AvailabilityZone": spec.availability_zone,
            "CidrBlock": spec.cidr_block,
            "MapPublicIpOnLaunch": public,
            "Tags": name_tag(&name),
        }),
    )
}

struct InternetGateway {
    gateway: ResourceHandle,
    attachment: ResourceHandle,
}

fn create_internet_gateway(
    stack: &mut Stack,
    vpc: &ResourceHandle,
) -> Result<InternetGateway, DeployError> {
    let name = stack.resource_name("vpc-igw");
    let gateway = stack.add_resource(
        "vpc-igw",
        "AWS::EC2::InternetGateway",
        json!({ "Tags": name_tag(&name) }),
    )?;
    let attachment = stack.add_resource(
        "internet-gateway-attachment",
        "AWS::EC2::VPCGatewayAttachment",
        json!({
            "VpcId": vpc.reference(),
            "InternetGatewayId": gateway.reference(),
        }),
    )?;
    Ok(InternetGateway {
        gateway,
        attachment,
    })
}

/// Per-subnet route table with a default route through the gateway. The
/// route carries an explicit dependency on the gateway attachment.
fn route_to_internet_gateway(
    stack: &mut Stack,
    vpc: &ResourceHandle,
    gateway: &ResourceHandle,
    attachment: &ResourceHandle,
    subnet: &ResourceHandle,
    spec: &SubnetSpec,
) -> Result<(), DeployError> {
    let route_table = stack.add_resource(
        &format!("{}-rt", spec.name_suffix),
        "AWS::EC2::RouteTable",
        json!({ "VpcId": vpc.reference() }),
    )?;
    stack.add_resource(
        &format!("{}-rt-assoc", spec.name_suffix),
        "AWS::EC2::SubnetRouteTableAssociation",
        json!({
            "SubnetId": subnet.reference(),
            "RouteTableId": route_table.reference(),
        }),
    )?;
    stack.add_resource_with_dependencies(
        &format!("{}-igw-route", spec.name_suffix),
        "AWS::EC2::Route",
        json!({
            "RouteTableId": route_table.reference(),
            "DestinationCidrBlock": "0.0.0.0/0",
            "GatewayId": gateway.reference(),
        }),
        &[attachment],
    )?;
    Ok(())
}

fn create_security_group(
    stack: &mut Stack,
    vpc: &ResourceHandle,
    name_suffix: &str,
) -> Result<ResourceHandle, DeployError> {
    let name = stack.resource_name(name_suffix);
    stack.add_resource(
        name_suffix,
        "AWS::EC2::SecurityGroup",
        json!({
            "GroupName": name,
            "GroupDescription": name,
            "VpcId": vpc.reference(),
        }),
    )
}

fn create_ingress(
    stack: &mut Stack,
    name_suffix: &str,
    source: &ResourceHandle,
    destination: &ResourceHandle,
    port: u16,
) -> Result<(), DeployError> {
    stack.add_resource(
        name_suffix,
        "AWS::EC2::SecurityGroupIngress",
        json!({
            "GroupId": destination.attribute("GroupId"),
            "SourceSecurityGroupId": source.attribute("GroupId"),
            "IpProtocol": IP_PROTOCOL,
            "FromPort": port,
            "ToPort": port,
        }),
    )?;
    Ok(())
}

fn create_egress(
    stack: &mut Stack,
    name_suffix: &str,
    source: &ResourceHandle,
    destination: &ResourceHandle,
    port: u16,
) -> Result<(), DeployError> {
    stack.add_resource(
        name_suffix,
        "AWS::EC2::SecurityGroupEgress",
        json!({
            "GroupId": source.attribute("GroupId"),
            "DestinationSecurityGroupId": destination.attribute("GroupId"),
            "IpProtocol": IP_PROTOCOL,
            "FromPort": port,
            "ToPort": port,
        }),
    )?;
    Ok(())
}

fn create_anywhere_egress(
    stack: &mut Stack,
    name_suffix: &str,
    source: &ResourceHandle,
    port: u16,
) -> Result<(), DeployError> {
    stack.add_resource(
        name_suffix,
        "AWS::EC2::SecurityGroupEgress",
        json!({
            "GroupId": source.attribute("GroupId"),
            "CidrIp": "0.0.0.0/0",
            "IpProtocol": IP_PROTOCOL,
            "FromPort": port,
            "ToPort": port,
        }),
    )?;
    Ok(())
}

fn create_secretsmanager_endpoint(
    stack: &mut Stack,
    vpc: &ResourceHandle,
    subnets: &[ResourceHandle],
    security_group: &ResourceHandle,
) -> Result<(), DeployError> {
    stack.add_resource(
        "secretsmanager-endpoint",
        "AWS::EC2::VPCEndpoint",
        json!({
            "VpcId": vpc.reference(),
            "ServiceName": format!("com.amazonaws.{REGION}.secretsmanager"),
            "VpcEndpointType": "Interface",
            "PrivateDnsEnabled": true,
            "SubnetIds": subnets.iter().map(ResourceHandle::reference).collect::<Vec<_>>(),
            "SecurityGroupIds": [security_group.attribute("GroupId")],
        }),
    )?;
    Ok(())
}
